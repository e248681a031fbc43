//! Input CSV fixtures shared by the integration and E2E tests

#![allow(dead_code)]

/// An input CSV together with what the worker should derive from it.
#[derive(Debug, Clone)]
pub struct CsvFixture {
    pub filename: &'static str,
    pub body: &'static str,
    pub expected_images: usize,
    pub description: &'static str,
}

/// Two products, one image each.
pub const PRODUCTS_CSV: CsvFixture = CsvFixture {
    filename: "products.csv",
    body: "S. No.,Product Name,Input Image Urls\n\
           1,SKU1,https://images.example.com/sku1.jpg\n\
           2,SKU2,https://images.example.com/sku2.jpg\n",
    expected_images: 2,
    description: "two rows, single URL per row",
};

/// One product with three images in a quoted, comma-separated cell.
pub const MULTI_URL_CSV: CsvFixture = CsvFixture {
    filename: "multi.csv",
    body: "S. No.,Product Name,Input Image Urls\n\
           1,Sneaker,\"https://images.example.com/a.jpg,https://images.example.com/b.jpg,https://images.example.com/c.jpg\"\n",
    expected_images: 3,
    description: "one row, three URLs",
};

/// Build an input CSV whose every row points at `image_url`.
pub fn csv_with_image(products: &[&str], image_url: &str) -> String {
    let mut body = String::from("S. No.,Product Name,Input Image Urls\n");
    for (idx, product) in products.iter().enumerate() {
        body.push_str(&format!("{},{},{}\n", idx + 1, product, image_url));
    }
    body
}

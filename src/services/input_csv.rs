/// Header naming the product column of an input CSV.
pub const PRODUCT_NAME_COLUMN: &str = "Product Name";
/// Header naming the image URL column; cells may hold several comma-separated URLs.
pub const INPUT_URLS_COLUMN: &str = "Input Image Urls";

/// One image to process, taken from an input CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub product_name: String,
    pub url: String,
}

/// Parse an uploaded input CSV into the images it references, in file order.
pub fn parse_input_csv(data: &[u8]) -> Result<Vec<ImageEntry>, InputCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
            .ok_or(InputCsvError::MissingColumn(name))
    };
    let product_idx = column(PRODUCT_NAME_COLUMN)?;
    let urls_idx = column(INPUT_URLS_COLUMN)?;

    let mut entries = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = idx + 2;

        let product_name = record.get(product_idx).unwrap_or_default().trim();
        if product_name.is_empty() {
            return Err(InputCsvError::EmptyProductName { line });
        }

        let urls: Vec<&str> = record
            .get(urls_idx)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(InputCsvError::NoImageUrls { line });
        }

        entries.extend(urls.into_iter().map(|url| ImageEntry {
            product_name: product_name.to_string(),
            url: url.to_string(),
        }));
    }

    if entries.is_empty() {
        return Err(InputCsvError::Empty);
    }

    Ok(entries)
}

#[derive(Debug, thiserror::Error)]
pub enum InputCsvError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column \"{0}\"")]
    MissingColumn(&'static str),

    #[error("Line {line}: product name is empty")]
    EmptyProductName { line: usize },

    #[error("Line {line}: no input image URLs")]
    NoImageUrls { line: usize },

    #[error("CSV contains no images")]
    Empty,
}

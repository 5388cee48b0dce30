use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::NaiveDate;

/// Accepted input formats for dates typed by the user.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Helper function to format the date
///
/// This function takes a `NaiveDate` and formats it as a string in the "dd-mm-yyyy" format.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Parses a user-typed date, trying ISO first.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Helper function to escape special characters for Markdown
///
/// Every character with a meaning in Telegram's MarkdownV2 is prefixed with
/// a backslash so it is shown literally.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "_*[]()~`>#+-=|{}.!\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Encodes raw image bytes as a `data:` URI.
pub fn image_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

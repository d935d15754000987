//! Static reference data for the BOJ time-series statistics search site.
//!
//! The database table mirrors the list published on the site's API manual.
//! It is consumed for validation only; the server remains authoritative for
//! everything else.

use crate::error::Error;

/// Known database codes and their English descriptions, sorted by code.
pub const DATABASES: &[(&str, &str)] = &[
    ("BIS01", "BIS International Banking Statistics in Japan"),
    ("BP01", "Balance of Payments"),
    ("BP02", "International Investment Position"),
    ("BS01", "Bank of Japan Accounts"),
    ("CO", "Tankan (Short-term Economic Survey of Enterprises in Japan)"),
    ("DL01", "Deposits, Vault Cash, and Loans and Bills Discounted"),
    ("FF", "Flow of Funds Accounts"),
    ("FM01", "Call Money Market Rates"),
    ("FM02", "Tokyo Interbank Offered Rates (TIBOR)"),
    ("FM03", "Yields on Government Bonds"),
    ("FM08", "Foreign Exchange Rates"),
    ("IR01", "The Basic Discount Rate and Basic Loan Rate"),
    ("IR02", "Interest Rates on Deposits and Loans"),
    ("IR03", "Average Contract Interest Rates on Loans and Discounts"),
    ("IR04", "Prime Lending Rates of Banks"),
    ("MD01", "Monetary Base"),
    ("MD02", "Money Stock"),
    ("PR01", "Producer Price Index"),
    ("PR02", "Services Producer Price Index"),
    ("PS01", "Payment and Settlement Statistics"),
    ("ST01", "Senior Loan Officer Opinion Survey on Bank Lending Practices"),
];

/// All known database codes with descriptions. No network call.
pub fn databases() -> &'static [(&'static str, &'static str)] {
    DATABASES
}

/// Validate a database code against [`DATABASES`], case-insensitively.
///
/// Returns the canonical uppercase form used for the rest of the query.
pub fn validate_database(code: &str) -> Result<String, Error> {
    let canonical = code.trim().to_ascii_uppercase();
    if DATABASES.binary_search_by(|(db, _)| (*db).cmp(canonical.as_str())).is_ok() {
        Ok(canonical)
    } else {
        Err(Error::UnknownDatabase(code.to_string()))
    }
}

/// Description of a known database code, if any.
pub fn describe_database(code: &str) -> Option<&'static str> {
    let canonical = code.trim().to_ascii_uppercase();
    DATABASES
        .binary_search_by(|(db, _)| (*db).cmp(canonical.as_str()))
        .ok()
        .map(|i| DATABASES[i].1)
}

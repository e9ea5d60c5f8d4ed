// src/services/numbering.rs

use sqlx::PgConnection;

use crate::{
    common::error::AppError,
    db::{CounterRepository, SettingsRepository},
    models::settings::{
        DEFAULT_INVOICE_PREFIX, DEFAULT_QUOTE_PREFIX, INVOICE_PREFIX, QUOTE_PREFIX,
    },
};

/// Minimum width of the numeric part. Wider numbers are never truncated.
const NUMBER_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSeries {
    Quote,
    Invoice,
}

impl DocumentSeries {
    /// Row key in `document_counters`.
    pub fn key(self) -> &'static str {
        match self {
            DocumentSeries::Quote => "quote",
            DocumentSeries::Invoice => "invoice",
        }
    }

    fn prefix_setting(self) -> &'static str {
        match self {
            DocumentSeries::Quote => QUOTE_PREFIX,
            DocumentSeries::Invoice => INVOICE_PREFIX,
        }
    }

    fn default_prefix(self) -> &'static str {
        match self {
            DocumentSeries::Quote => DEFAULT_QUOTE_PREFIX,
            DocumentSeries::Invoice => DEFAULT_INVOICE_PREFIX,
        }
    }
}

/// Next number of a series: `"{prefix}-0001"` for the first one, otherwise
/// the numeric suffix after the last `-` of `last` plus one.
///
/// The suffix is re-joined with the *current* prefix, so changing the prefix
/// setting keeps the count going.
pub fn next_number(prefix: &str, last: Option<&str>) -> Result<String, AppError> {
    let next = match last {
        None => 1,
        Some(last) => {
            let suffix = last.rsplit_once('-').map(|(_, s)| s).unwrap_or(last);
            suffix
                .parse::<u64>()
                .ok()
                .and_then(|n| n.checked_add(1))
                .ok_or_else(|| AppError::Format(last.to_string()))?
        }
    };

    Ok(format!("{prefix}-{next:0width$}", width = NUMBER_WIDTH))
}

#[derive(Clone)]
pub struct NumberingService {
    counters: CounterRepository,
    settings: SettingsRepository,
}

impl NumberingService {
    pub fn new(counters: CounterRepository, settings: SettingsRepository) -> Self {
        Self { counters, settings }
    }

    /// Issues the next number of `series`. Must run inside the transaction that
    /// stores the numbered document: the counter row stays locked until it ends,
    /// and a rollback gives the number back.
    pub async fn issue(&self, conn: &mut PgConnection, series: DocumentSeries) -> Result<String, AppError> {
        self.counters.ensure_series(&mut *conn, series.key()).await?;
        let last = self.counters.lock_last_number(&mut *conn, series.key()).await?;
        let prefix = self.prefix_for(&mut *conn, series).await?;

        let number = next_number(&prefix, last.as_deref()).inspect_err(|e| {
            tracing::error!(series = series.key(), error = %e, "Stored document counter is corrupt");
        })?;

        self.counters.store_last_number(&mut *conn, series.key(), &number).await?;

        tracing::debug!(series = series.key(), %number, "Document number issued");
        Ok(number)
    }

    async fn prefix_for(&self, conn: &mut PgConnection, series: DocumentSeries) -> Result<String, AppError> {
        let stored = self.settings.get_setting(conn, series.prefix_setting()).await?;

        let prefix = stored
            .map(|s| s.value.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| series.default_prefix().to_string());

        Ok(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_number_of_a_series() {
        assert_eq!(next_number("QT", None).unwrap(), "QT-0001");
        assert_eq!(next_number("INV", None).unwrap(), "INV-0001");
    }

    #[test]
    fn increments_the_numeric_suffix() {
        assert_eq!(next_number("QT", Some("QT-0042")).unwrap(), "QT-0043");
        assert_eq!(next_number("INV", Some("INV-0009")).unwrap(), "INV-0010");
    }

    #[test]
    fn width_grows_past_four_digits() {
        assert_eq!(next_number("QT", Some("QT-9999")).unwrap(), "QT-10000");
        assert_eq!(next_number("QT", Some("QT-10000")).unwrap(), "QT-10001");
    }

    #[test]
    fn only_the_last_dash_delimits_the_suffix() {
        assert_eq!(next_number("ACME-QT", Some("ACME-QT-0007")).unwrap(), "ACME-QT-0008");
    }

    #[test]
    fn prefix_change_keeps_the_count() {
        assert_eq!(next_number("EST", Some("QT-0042")).unwrap(), "EST-0043");
    }

    #[test]
    fn sequence_of_n_calls_yields_p_000n() {
        let mut last: Option<String> = None;
        for n in 1..=12 {
            let number = next_number("QT", last.as_deref()).unwrap();
            assert_eq!(number, format!("QT-{n:04}"));
            last = Some(number);
        }
    }

    #[test]
    fn unparseable_suffix_is_a_format_error() {
        for corrupt in ["QT-00A1", "QT-", "QT-12.5", "garbage", "QT-0x10"] {
            assert!(
                matches!(next_number("QT", Some(corrupt)), Err(AppError::Format(_))),
                "{corrupt} should be rejected"
            );
        }
    }

    #[test]
    fn overflowing_counter_is_a_format_error() {
        let last = format!("QT-{}", u64::MAX);
        assert!(matches!(next_number("QT", Some(&last)), Err(AppError::Format(_))));
    }
}

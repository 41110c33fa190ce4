//! Document number allocation
//!
//! Hands out sequential, configuration-driven document numbers per tenant and
//! per document series, scoped to a fiscal-year window.

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::traits::MastersStorage;
use crate::types::*;
use crate::utils::validation::{validate_series_name, validate_tenant_id};

/// Sequence allocation engine
pub struct SequenceAllocator<S: MastersStorage> {
    pub(crate) storage: S,
}

impl<S: MastersStorage> SequenceAllocator<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Reserve and render the next number from the series active on
    /// `on_date`.
    ///
    /// The underlying counter increment is atomic at the storage layer, so
    /// concurrent calls never observe the same number. An allocated number is
    /// permanently consumed even if the surrounding document insert fails
    /// afterwards; gaps in the visible sequence are expected behavior, not a
    /// bug.
    pub async fn allocate(
        &mut self,
        tenant_id: &str,
        series_type: SeriesType,
        series_name: &str,
        on_date: NaiveDate,
    ) -> MastersResult<String> {
        let allocated = self
            .storage
            .allocate_sequence(tenant_id, series_type, series_name, on_date)
            .await?
            .ok_or_else(|| MastersError::NoActiveSeries {
                series_type,
                series_name: series_name.to_string(),
                on_date,
            })?;

        let rendered = render(&allocated);
        debug!(
            tenant_id,
            %series_type,
            series_name,
            number = allocated.value,
            %rendered,
            "allocated document number"
        );
        Ok(rendered)
    }

    /// Persist one numbering configuration, validating its invariants first
    pub async fn seed_series(&mut self, config: NumberingConfig) -> MastersResult<NumberingConfig> {
        validate_tenant_id(&config.tenant_id)?;
        validate_series_name(&config.series_name)?;
        config.validate()?;
        self.storage.insert_numbering_config(&config).await?;
        Ok(config)
    }

    /// Administrative onboarding step: create one configuration per document
    /// series type for the fiscal year starting at `fiscal_year_start`.
    ///
    /// Each series starts at 1, pads to four digits, and carries the
    /// conventional prefix plus a `/YY-YY` fiscal-year suffix.
    pub async fn seed_standard_series(
        &mut self,
        tenant_id: &str,
        fiscal_year_start: NaiveDate,
    ) -> MastersResult<Vec<NumberingConfig>> {
        let effective_to = fiscal_year_end(fiscal_year_start);
        let suffix = fiscal_year_suffix(fiscal_year_start, effective_to);

        let series = [
            (SeriesType::Sales, "Sales Invoice"),
            (SeriesType::Purchase, "Purchase Invoice"),
            (SeriesType::Payment, "Payment Voucher"),
            (SeriesType::Receipt, "Receipt Voucher"),
            (SeriesType::Journal, "Journal Voucher"),
            (SeriesType::Contra, "Contra Voucher"),
            (SeriesType::CreditNote, "Credit Note"),
            (SeriesType::DebitNote, "Debit Note"),
        ];

        let mut seeded = Vec::with_capacity(series.len());
        for (series_type, series_name) in series {
            let config = NumberingConfig {
                tenant_id: tenant_id.to_string(),
                series_type,
                series_name: series_name.to_string(),
                prefix: series_type.default_prefix().to_string(),
                suffix: suffix.clone(),
                start_from: 1,
                current_number: 1,
                required_digits: 4,
                effective_from: fiscal_year_start,
                effective_to,
                is_active: true,
            };
            seeded.push(self.seed_series(config).await?);
        }

        info!(
            tenant_id,
            count = seeded.len(),
            fiscal_year = %suffix,
            "seeded standard numbering series"
        );
        Ok(seeded)
    }
}

/// Render an allocated number as `prefix + zero-padded value + suffix`.
///
/// `required_digits` controls padding width only; values wider than the
/// width render at full length.
pub fn render(allocated: &AllocatedNumber) -> String {
    format!(
        "{}{:0width$}{}",
        allocated.prefix,
        allocated.value,
        allocated.suffix,
        width = allocated.required_digits
    )
}

/// Last day of a fiscal year starting on `start` (the day before its first
/// anniversary)
fn fiscal_year_end(start: NaiveDate) -> NaiveDate {
    start
        .with_year(start.year() + 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(start.year() + 1, 3, 1).unwrap_or(start))
        .pred_opt()
        .unwrap_or(start)
}

/// `/YY-YY` suffix for a fiscal-year window, e.g. `/25-26`
fn fiscal_year_suffix(from: NaiveDate, to: NaiveDate) -> String {
    format!("/{:02}-{:02}", from.year() % 100, to.year() % 100)
}

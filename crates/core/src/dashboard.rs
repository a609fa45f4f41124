//! Admin overview statistics derived from already-fetched lists.
//!
//! Pure aggregation over deal, project, and invoice summaries. The caller
//! fetches the lists and passes `today` so results are reproducible.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::completion::compute_percentage;
use crate::field::DATE_FORMAT;
use crate::status::{DealStatus, InvoiceStatus, Lifecycle, ProjectStage};
use crate::types::EntityId;

/// Days ahead counted as "upcoming" for events.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealSummary {
    pub id: EntityId,
    pub status: DealStatus,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub deal_value: f64,
    #[serde(default, deserialize_with = "lenient_date")]
    pub event_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: EntityId,
    pub status: ProjectStage,
    #[serde(default, deserialize_with = "lenient_date")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: EntityId,
    pub status: InvoiceStatus,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
}

/// Money as sent by the API: a number, a decimal string (`numeric`
/// columns), or `null` for unset (0.0).
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("amount out of range: {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid amount '{s}'"))),
        Some(other) => Err(D::Error::custom(format!("invalid amount {other}"))),
    }
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its date. Blank and
/// `null` are unset.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(|_| D::Error::custom(format!("invalid date '{raw}'")))
}

impl InvoiceSummary {
    /// Marked overdue, or sent and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.status {
            InvoiceStatus::Overdue => true,
            InvoiceStatus::Sent => self.due_date.is_some_and(|due| due < today),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_deals: usize,
    pub open_deals: usize,
    /// Sum of open deal values.
    pub pipeline_value: f64,
    pub won_deals: usize,
    pub won_value: f64,
    /// Won deals as a percentage of closed (won + lost) deals.
    pub win_rate: u8,
    pub active_projects: usize,
    /// Project counts keyed by stage string.
    pub projects_by_stage: BTreeMap<String, usize>,
    /// Active projects with an event in the next [`UPCOMING_WINDOW_DAYS`].
    pub upcoming_events: usize,
    pub outstanding_amount: f64,
    pub overdue_invoices: usize,
    pub overdue_amount: f64,
    pub collected_amount: f64,
}

pub fn compute_stats(
    deals: &[DealSummary],
    projects: &[ProjectSummary],
    invoices: &[InvoiceSummary],
    today: NaiveDate,
) -> DashboardStats {
    let mut stats = DashboardStats {
        total_deals: deals.len(),
        ..DashboardStats::default()
    };

    let mut lost_deals = 0usize;
    for deal in deals {
        match deal.status {
            DealStatus::Won => {
                stats.won_deals += 1;
                stats.won_value += deal.deal_value;
            }
            DealStatus::Lost => lost_deals += 1,
            _ => {
                stats.open_deals += 1;
                stats.pipeline_value += deal.deal_value;
            }
        }
    }
    stats.win_rate = compute_percentage(stats.won_deals + lost_deals, stats.won_deals);

    let horizon = today + chrono::Duration::days(UPCOMING_WINDOW_DAYS);
    for project in projects {
        *stats
            .projects_by_stage
            .entry(project.status.as_str().to_string())
            .or_default() += 1;

        if project.status.is_active() {
            stats.active_projects += 1;
            if project
                .event_date
                .is_some_and(|date| date >= today && date <= horizon)
            {
                stats.upcoming_events += 1;
            }
        }
    }

    for invoice in invoices {
        if invoice.status == InvoiceStatus::Paid {
            stats.collected_amount += invoice.amount;
        }
        if invoice.status.is_outstanding() {
            stats.outstanding_amount += invoice.amount;
        }
        if invoice.is_overdue(today) {
            stats.overdue_invoices += 1;
            stats.overdue_amount += invoice.amount;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn deal(id: EntityId, status: DealStatus, value: f64) -> DealSummary {
        DealSummary {
            id,
            status,
            deal_value: value,
            event_date: None,
        }
    }

    fn project(id: EntityId, status: ProjectStage, event: Option<&str>) -> ProjectSummary {
        ProjectSummary {
            id,
            status,
            event_date: event.map(date),
            budget: 0.0,
        }
    }

    fn invoice(id: EntityId, status: InvoiceStatus, amount: f64, due: Option<&str>) -> InvoiceSummary {
        InvoiceSummary {
            id,
            status,
            amount,
            due_date: due.map(date),
        }
    }

    #[test]
    fn empty_lists_produce_zero_stats() {
        let stats = compute_stats(&[], &[], &[], date("2026-10-19"));
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn deal_pipeline_and_win_rate() {
        let deals = vec![
            deal(1, DealStatus::Lead, 10_000.0),
            deal(2, DealStatus::Negotiation, 25_000.0),
            deal(3, DealStatus::Won, 40_000.0),
            deal(4, DealStatus::Won, 15_000.0),
            deal(5, DealStatus::Lost, 30_000.0),
        ];
        let stats = compute_stats(&deals, &[], &[], date("2026-10-19"));

        assert_eq!(stats.total_deals, 5);
        assert_eq!(stats.open_deals, 2);
        assert!((stats.pipeline_value - 35_000.0).abs() < f64::EPSILON);
        assert_eq!(stats.won_deals, 2);
        assert!((stats.won_value - 55_000.0).abs() < f64::EPSILON);
        assert_eq!(stats.win_rate, 67);
    }

    #[test]
    fn upcoming_events_only_count_active_projects_in_window() {
        let today = date("2026-10-19");
        let projects = vec![
            project(1, ProjectStage::PreEvent, Some("2026-10-25")),
            project(2, ProjectStage::LogisticsPlanning, Some("2026-11-18")),
            project(3, ProjectStage::Invoicing, Some("2026-11-19")),
            project(4, ProjectStage::Cancelled, Some("2026-10-20")),
            project(5, ProjectStage::FollowUp, Some("2026-10-01")),
            project(6, ProjectStage::Invoicing, None),
        ];
        let stats = compute_stats(&[], &projects, &[], today);

        assert_eq!(stats.upcoming_events, 2);
        assert_eq!(stats.active_projects, 5);
        assert_eq!(stats.projects_by_stage.get("invoicing"), Some(&2));
        assert_eq!(stats.projects_by_stage.get("cancelled"), Some(&1));
    }

    #[test]
    fn invoice_totals_and_overdue_detection() {
        let today = date("2026-10-19");
        let invoices = vec![
            invoice(1, InvoiceStatus::Paid, 5_000.0, None),
            invoice(2, InvoiceStatus::Sent, 2_000.0, Some("2026-10-30")),
            invoice(3, InvoiceStatus::Sent, 3_000.0, Some("2026-10-01")),
            invoice(4, InvoiceStatus::Overdue, 1_000.0, None),
            invoice(5, InvoiceStatus::Draft, 9_000.0, Some("2026-01-01")),
        ];
        let stats = compute_stats(&[], &[], &invoices, today);

        assert!((stats.collected_amount - 5_000.0).abs() < f64::EPSILON);
        assert!((stats.outstanding_amount - 6_000.0).abs() < f64::EPSILON);
        assert_eq!(stats.overdue_invoices, 2);
        assert!((stats.overdue_amount - 4_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summaries_deserialize_from_api_json() {
        let deal: DealSummary = serde_json::from_value(serde_json::json!({
            "id": 7,
            "status": "proposal",
            "deal_value": 12000.5,
            "client_name": "Acme"
        }))
        .unwrap();
        assert_eq!(deal.status, DealStatus::Proposal);
        assert!(deal.event_date.is_none());

        let invoice: InvoiceSummary = serde_json::from_value(serde_json::json!({
            "id": 1,
            "status": "sent",
            "amount": 100,
            "due_date": "2026-12-01"
        }))
        .unwrap();
        assert_eq!(invoice.due_date, Some(date("2026-12-01")));
    }

    #[test]
    fn amounts_accept_null_and_decimal_strings() {
        let deal: DealSummary = serde_json::from_value(serde_json::json!({
            "id": 1,
            "status": "lead",
            "deal_value": "12000.00"
        }))
        .unwrap();
        assert!((deal.deal_value - 12_000.0).abs() < f64::EPSILON);

        let deal: DealSummary = serde_json::from_value(serde_json::json!({
            "id": 2,
            "status": "lead",
            "deal_value": null
        }))
        .unwrap();
        assert_eq!(deal.deal_value, 0.0);

        let project: ProjectSummary = serde_json::from_value(serde_json::json!({
            "id": 3,
            "status": "invoicing",
            "budget": ""
        }))
        .unwrap();
        assert_eq!(project.budget, 0.0);

        let bad = serde_json::from_value::<InvoiceSummary>(serde_json::json!({
            "id": 4,
            "status": "sent",
            "amount": "lots"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn dates_accept_timestamps_and_null() {
        let deal: DealSummary = serde_json::from_value(serde_json::json!({
            "id": 1,
            "status": "won",
            "event_date": "2026-11-05T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(deal.event_date, Some(date("2026-11-05")));

        let invoice: InvoiceSummary = serde_json::from_value(serde_json::json!({
            "id": 2,
            "status": "sent",
            "amount": "150.50",
            "due_date": null
        }))
        .unwrap();
        assert!(invoice.due_date.is_none());
        assert!((invoice.amount - 150.5).abs() < f64::EPSILON);
    }

    #[test]
    fn postgres_shaped_rows_are_all_counted() {
        let deals: Vec<DealSummary> = serde_json::from_value(serde_json::json!([
            { "id": 1, "status": "lead", "deal_value": "10000.00" },
            { "id": 2, "status": "proposal", "deal_value": null },
            { "id": 3, "status": "won", "deal_value": 5000 }
        ]))
        .unwrap();
        let invoices: Vec<InvoiceSummary> = serde_json::from_value(serde_json::json!([
            { "id": 1, "status": "sent", "amount": "750.00", "due_date": "2026-10-01T09:30:00+02:00" }
        ]))
        .unwrap();

        let stats = compute_stats(&deals, &[], &invoices, date("2026-10-19"));
        assert_eq!(stats.total_deals, 3);
        assert!((stats.pipeline_value - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(stats.overdue_invoices, 1);
        assert!((stats.overdue_amount - 750.0).abs() < f64::EPSILON);
    }
}

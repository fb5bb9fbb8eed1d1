//! Funds, contributions and giving summaries

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde_json::json;

use super::{new_id, DataStore};
use crate::models::{
    Contribution, ContributionFilter, CreateFundRequest, Fund, FundTotal, GivingSummary,
    GivingTotals, MonthlyTotal, NewAuditEntry, RecordContributionRequest,
    UpdateContributionRequest, UpdateFundRequest,
};
use crate::services::ChangeSet;
use crate::utils::{StoreError, StoreResult};

const DEFAULT_FUND_LABEL: &str = "General Offering";
const UNASSIGNED_FUND_NAME: &str = "General";
/// Months with at least one gift kept in the monthly breakdown; empty months are skipped
const SUMMARY_MONTHS: usize = 6;

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl DataStore {
    fn fund_index(&self, id: &str) -> StoreResult<usize> {
        self.funds
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| StoreError::missing("Fund"))
    }

    fn contribution_index(&self, id: &str) -> StoreResult<usize> {
        self.contributions
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::missing("Contribution"))
    }

    /// Only live funds may receive new gifts
    fn ensure_active_fund(&self, fund_id: Option<&str>) -> StoreResult<()> {
        match fund_id {
            Some(id) if !self.funds.iter().any(|f| f.id == id && f.deleted_at.is_none()) => {
                Err(StoreError::missing("Fund"))
            }
            _ => Ok(()),
        }
    }

    fn fund_action(&mut self, actor_id: &str, fund: &Fund, action: &str, verb: &str) {
        let summary = format!("{} {} fund {}", self.display_name(actor_id), verb, fund.name);
        self.record(
            NewAuditEntry::new(actor_id, action, "fund", summary)
                .entity_id(&fund.id)
                .metadata(json!({ "fundId": fund.id, "name": fund.name })),
        );
    }

    pub fn list_funds(&self, include_deleted: bool) -> Vec<Fund> {
        self.funds
            .iter()
            .filter(|f| f.church_id == self.church.id)
            .filter(|f| include_deleted || f.deleted_at.is_none())
            .cloned()
            .collect()
    }

    pub fn create_fund(&mut self, actor_id: &str, input: CreateFundRequest) -> StoreResult<Fund> {
        let now = Utc::now();
        let fund = Fund {
            id: new_id("fund"),
            church_id: self.church.id.clone(),
            name: input.name.trim().to_string(),
            description: input.description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.funds.push(fund.clone());
        self.fund_action(actor_id, &fund, "fund.created", "created");
        Ok(fund)
    }

    pub fn update_fund(&mut self, actor_id: &str, id: &str, input: UpdateFundRequest) -> StoreResult<Fund> {
        let index = self.fund_index(id)?;
        let fund = &mut self.funds[index];

        let mut changes = ChangeSet::new();
        changes.track("name", &mut fund.name, input.name.map(|n| n.trim().to_string()));
        changes.track("description", &mut fund.description, input.description);
        if !changes.is_empty() {
            fund.updated_at = Utc::now();
        }
        let updated = fund.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!("{} updated fund {}", self.display_name(actor_id), updated.name);
            self.record(
                NewAuditEntry::new(actor_id, "fund.updated", "fund", summary)
                    .entity_id(id)
                    .metadata(json!({ "fundId": id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    /// Soft delete: the fund disappears from listings but keeps its history
    pub fn delete_fund(&mut self, actor_id: &str, id: &str) -> StoreResult<Fund> {
        let index = self.fund_index(id)?;
        if self.funds[index].deleted_at.is_some() {
            return Err(StoreError::rule("Fund is already deleted"));
        }
        self.funds[index].deleted_at = Some(Utc::now());
        let fund = self.funds[index].clone();
        self.fund_action(actor_id, &fund, "fund.deleted", "deleted");
        Ok(fund)
    }

    pub fn restore_fund(&mut self, actor_id: &str, id: &str) -> StoreResult<Fund> {
        let index = self.fund_index(id)?;
        if self.funds[index].deleted_at.is_none() {
            return Err(StoreError::rule("Fund is not deleted"));
        }
        self.funds[index].deleted_at = None;
        self.funds[index].updated_at = Utc::now();
        let fund = self.funds[index].clone();
        self.fund_action(actor_id, &fund, "fund.restored", "restored");
        Ok(fund)
    }

    /// Remove a fund for good; its contributions lose their fund reference
    pub fn hard_delete_fund(&mut self, actor_id: &str, id: &str) -> StoreResult<()> {
        let index = self.fund_index(id)?;
        let fund = self.funds.remove(index);
        let mut orphaned = 0;
        for contribution in &mut self.contributions {
            if contribution.fund_id.as_deref() == Some(id) {
                contribution.fund_id = None;
                orphaned += 1;
            }
        }

        let summary = format!("{} permanently deleted fund {}", self.display_name(actor_id), fund.name);
        self.record(
            NewAuditEntry::new(actor_id, "fund.purged", "fund", summary)
                .entity_id(id)
                .metadata(json!({
                    "fundId": id,
                    "name": fund.name,
                    "orphanedContributions": orphaned,
                })),
        );
        Ok(())
    }

    /// Live contributions, newest gift date first
    pub fn list_contributions(&self, filter: &ContributionFilter) -> Vec<Contribution> {
        let mut list: Vec<Contribution> = self
            .contributions
            .iter()
            .filter(|c| c.church_id == self.church.id && c.deleted_at.is_none())
            .filter(|c| filter.member_id.as_deref().map_or(true, |m| c.member_id == m))
            .filter(|c| {
                filter
                    .fund_id
                    .as_deref()
                    .map_or(true, |f| c.fund_id.as_deref() == Some(f))
            })
            .filter(|c| filter.from.map_or(true, |from| c.date >= from))
            .filter(|c| filter.to.map_or(true, |to| c.date <= to))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.date.cmp(&a.date));
        list
    }

    pub fn get_contribution(&self, id: &str) -> StoreResult<Contribution> {
        let index = self.contribution_index(id)?;
        Ok(self.contributions[index].clone())
    }

    /// Record a gift; the giver defaults to the actor
    pub fn record_contribution(
        &mut self,
        actor_id: &str,
        input: RecordContributionRequest,
    ) -> StoreResult<Contribution> {
        let member_id = input.member_id.unwrap_or_else(|| actor_id.to_string());
        if self.live_user(&member_id).is_none() {
            return Err(StoreError::missing("User"));
        }
        self.ensure_active_fund(input.fund_id.as_deref())?;

        let contribution = Contribution {
            id: new_id("contribution"),
            church_id: self.church.id.clone(),
            member_id,
            amount: input.amount,
            date: input.date.unwrap_or_else(|| Utc::now().date_naive()),
            fund_id: input.fund_id,
            method: input.method,
            note: input.note,
            deleted_at: None,
        };

        let member_name = self.display_name(&contribution.member_id);
        let summary = if actor_id == contribution.member_id {
            let fund_label = contribution
                .fund_id
                .as_deref()
                .and_then(|id| self.funds.iter().find(|f| f.id == id))
                .map(|f| f.name.clone())
                .unwrap_or_else(|| DEFAULT_FUND_LABEL.to_string());
            format!(
                "{} logged a ${:.2} {} gift to {}",
                member_name,
                contribution.amount,
                contribution.method.label(),
                fund_label
            )
        } else {
            format!(
                "{} recorded ${:.2} {} gift for {}",
                self.display_name(actor_id),
                contribution.amount,
                contribution.method.label(),
                member_name
            )
        };

        self.contributions.push(contribution.clone());
        self.record(
            NewAuditEntry::new(actor_id, "giving.recorded", "contribution", summary)
                .entity_id(&contribution.id)
                .metadata(json!({
                    "memberId": contribution.member_id,
                    "amount": contribution.amount,
                    "fundId": contribution.fund_id,
                    "method": contribution.method,
                })),
        );
        Ok(contribution)
    }

    pub fn update_contribution(
        &mut self,
        actor_id: &str,
        id: &str,
        input: UpdateContributionRequest,
    ) -> StoreResult<Contribution> {
        let index = self.contribution_index(id)?;
        if let Some(member_id) = &input.member_id {
            if self.live_user(member_id).is_none() {
                return Err(StoreError::missing("User"));
            }
        }
        if let Some(fund_id) = &input.fund_id {
            self.ensure_active_fund(fund_id.as_deref())?;
        }

        let contribution = &mut self.contributions[index];
        let mut changes = ChangeSet::new();
        changes.track("memberId", &mut contribution.member_id, input.member_id);
        changes.track("amount", &mut contribution.amount, input.amount);
        changes.track("date", &mut contribution.date, input.date);
        changes.track("fundId", &mut contribution.fund_id, input.fund_id);
        changes.track("method", &mut contribution.method, input.method);
        changes.track("note", &mut contribution.note, input.note);
        let updated = contribution.clone();

        if let Some(diff) = changes.into_diff() {
            let summary = format!(
                "{} updated a contribution for {}",
                self.display_name(actor_id),
                self.display_name(&updated.member_id)
            );
            self.record(
                NewAuditEntry::new(actor_id, "contribution.updated", "contribution", summary)
                    .entity_id(id)
                    .metadata(json!({ "contributionId": id, "memberId": updated.member_id }))
                    .diff(Some(diff)),
            );
        }
        Ok(updated)
    }

    fn contribution_action(&mut self, actor_id: &str, contribution: &Contribution, action: &str, verb: &str) {
        let summary = format!(
            "{} {} a ${:.2} contribution from {}",
            self.display_name(actor_id),
            verb,
            contribution.amount,
            self.display_name(&contribution.member_id)
        );
        self.record(
            NewAuditEntry::new(actor_id, action, "contribution", summary)
                .entity_id(&contribution.id)
                .metadata(json!({
                    "contributionId": contribution.id,
                    "memberId": contribution.member_id,
                    "amount": contribution.amount,
                })),
        );
    }

    pub fn delete_contribution(&mut self, actor_id: &str, id: &str) -> StoreResult<Contribution> {
        let index = self.contribution_index(id)?;
        if self.contributions[index].deleted_at.is_some() {
            return Err(StoreError::rule("Contribution is already deleted"));
        }
        self.contributions[index].deleted_at = Some(Utc::now());
        let contribution = self.contributions[index].clone();
        self.contribution_action(actor_id, &contribution, "contribution.deleted", "deleted");
        Ok(contribution)
    }

    pub fn restore_contribution(&mut self, actor_id: &str, id: &str) -> StoreResult<Contribution> {
        let index = self.contribution_index(id)?;
        if self.contributions[index].deleted_at.is_none() {
            return Err(StoreError::rule("Contribution is not deleted"));
        }
        self.contributions[index].deleted_at = None;
        let contribution = self.contributions[index].clone();
        self.contribution_action(actor_id, &contribution, "contribution.restored", "restored");
        Ok(contribution)
    }

    pub fn hard_delete_contribution(&mut self, actor_id: &str, id: &str) -> StoreResult<()> {
        let index = self.contribution_index(id)?;
        let contribution = self.contributions.remove(index);
        self.contribution_action(actor_id, &contribution, "contribution.purged", "permanently deleted");
        Ok(())
    }

    pub fn giving_summary(&self) -> GivingSummary {
        self.giving_summary_on(Utc::now().date_naive())
    }

    /// Totals relative to `today`
    ///
    /// `monthly` lists the most recent months that have gifts, newest first,
    /// however far back they lie.
    pub fn giving_summary_on(&self, today: NaiveDate) -> GivingSummary {
        let live: Vec<&Contribution> = self
            .contributions
            .iter()
            .filter(|c| c.church_id == self.church.id && c.deleted_at.is_none())
            .collect();

        let current_month = month_key(today);
        let first_of_month = today.with_day(1).unwrap_or(today);
        let previous_month = month_key(first_of_month - Duration::days(1));

        let overall: f64 = live.iter().map(|c| c.amount).sum();
        let month_sum = |key: &str| -> f64 {
            live.iter()
                .filter(|c| month_key(c.date) == key)
                .map(|c| c.amount)
                .sum()
        };
        let average_gift = if live.is_empty() {
            0.0
        } else {
            overall / live.len() as f64
        };

        let mut by_fund: Vec<FundTotal> = Vec::new();
        for contribution in &live {
            match by_fund.iter_mut().find(|t| t.fund_id == contribution.fund_id) {
                Some(total) => total.amount += contribution.amount,
                None => {
                    let name = match contribution.fund_id.as_deref() {
                        Some(id) => self
                            .funds
                            .iter()
                            .find(|f| f.id == id)
                            .map(|f| f.name.clone())
                            .unwrap_or_else(|| id.to_string()),
                        None => UNASSIGNED_FUND_NAME.to_string(),
                    };
                    by_fund.push(FundTotal {
                        fund_id: contribution.fund_id.clone(),
                        name,
                        amount: contribution.amount,
                    });
                }
            }
        }
        for total in &mut by_fund {
            total.amount = round_cents(total.amount);
        }
        by_fund.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));

        let mut months: BTreeMap<String, f64> = BTreeMap::new();
        for contribution in &live {
            *months.entry(month_key(contribution.date)).or_default() += contribution.amount;
        }
        let monthly = months
            .into_iter()
            .rev()
            .take(SUMMARY_MONTHS)
            .map(|(month, amount)| MonthlyTotal {
                month,
                amount: round_cents(amount),
            })
            .collect();

        GivingSummary {
            totals: GivingTotals {
                overall: round_cents(overall),
                month_to_date: round_cents(month_sum(&current_month)),
                previous_month: round_cents(month_sum(&previous_month)),
                average_gift: round_cents(average_gift),
            },
            by_fund,
            monthly,
        }
    }
}

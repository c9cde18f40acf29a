use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{EntryType, MetricsDashboard, ProjectMeta, STATUS_ACTIVE, STATUS_COMPLETED};

/// One project's contribution to the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMetrics {
    pub completed: u64,
    pub active: u64,
    pub idle: u64,
    pub out_of_budget: u64,
    pub total_debit: f64,
    pub total_credit: f64,
    /// Credit over debit, present only when the project has debit hours.
    pub ratio: Option<f64>,
}

impl PartialMetrics {
    /// Idle is judged on the latest status alone and does not exclude
    /// completed or active projects.
    pub fn from_meta(meta: &ProjectMeta, now: DateTime<Utc>, idle_threshold: TimeDelta) -> Self {
        let mut partial = PartialMetrics::default();

        if let Some(latest) = meta.status_history.first() {
            match latest.title.as_str() {
                STATUS_COMPLETED => partial.completed = 1,
                STATUS_ACTIVE => partial.active = 1,
                _ => {}
            }
            if now - latest.date_created > idle_threshold {
                partial.idle = 1;
            }
        }

        for entry in &meta.time_entries {
            match entry.entry_type {
                EntryType::Debit => partial.total_debit += entry.hours,
                EntryType::Credit => partial.total_credit += entry.hours,
            }
        }

        if partial.total_credit > partial.total_debit {
            partial.out_of_budget = 1;
        }
        if partial.total_debit > 0.0 {
            partial.ratio = Some(partial.total_credit / partial.total_debit);
        }

        partial
    }
}

/// Running totals over received partials. Owned by a single task.
#[derive(Debug, Default)]
pub struct Aggregator {
    completed: u64,
    active: u64,
    idle: u64,
    out_of_budget: u64,
    total_debit: f64,
    total_credit: f64,
    ratio_sum: f64,
    ratio_count: u64,
    received: usize,
}

impl Aggregator {
    pub fn add(&mut self, partial: &PartialMetrics) {
        self.received += 1;
        self.completed += partial.completed;
        self.active += partial.active;
        self.idle += partial.idle;
        self.out_of_budget += partial.out_of_budget;
        self.total_debit += partial.total_debit;
        self.total_credit += partial.total_credit;
        if let Some(ratio) = partial.ratio {
            self.ratio_sum += ratio;
            self.ratio_count += 1;
        }
    }

    pub fn received(&self) -> usize {
        self.received
    }

    /// The average ratio is the mean of per-project ratios, not total credit
    /// over total debit.
    pub fn finish(self, projects: u64, ending_soon: u64) -> MetricsDashboard {
        let avg_credit_over_debit = if self.ratio_count > 0 {
            self.ratio_sum / self.ratio_count as f64
        } else {
            0.0
        };

        MetricsDashboard {
            projects,
            active: self.active,
            completed: self.completed,
            idle: self.idle,
            out_of_budget: self.out_of_budget,
            total_debit: self.total_debit,
            total_credit: self.total_credit,
            avg_credit_over_debit,
            ending_soon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::fixtures::{entry, status};

    fn week() -> TimeDelta {
        TimeDelta::days(7)
    }

    #[test]
    fn latest_status_decides_state() {
        let meta = ProjectMeta {
            status_history: vec![status(2, 1, "active", 1), status(1, 1, "completed", 9)],
            ..Default::default()
        };
        let partial = PartialMetrics::from_meta(&meta, Utc::now(), week());

        assert_eq!(partial.active, 1);
        assert_eq!(partial.completed, 0);
        assert_eq!(partial.idle, 0);
    }

    #[test]
    fn completed_project_can_also_be_idle() {
        let meta = ProjectMeta {
            status_history: vec![status(1, 1, "completed", 30)],
            ..Default::default()
        };
        let partial = PartialMetrics::from_meta(&meta, Utc::now(), week());

        assert_eq!(partial.completed, 1);
        assert_eq!(partial.idle, 1);
    }

    #[test]
    fn project_without_statuses_still_counts_hours() {
        let meta = ProjectMeta {
            time_entries: vec![
                entry(1, 1, EntryType::Debit, 4.0, None),
                entry(2, 1, EntryType::Credit, 8.0, None),
            ],
            ..Default::default()
        };
        let partial = PartialMetrics::from_meta(&meta, Utc::now(), week());

        assert_eq!(partial.completed + partial.active + partial.idle, 0);
        assert_eq!(partial.total_debit, 4.0);
        assert_eq!(partial.total_credit, 8.0);
        assert_eq!(partial.out_of_budget, 1);
        assert_eq!(partial.ratio, Some(2.0));
    }

    #[test]
    fn no_debit_means_no_ratio() {
        let meta = ProjectMeta {
            time_entries: vec![entry(1, 1, EntryType::Credit, 3.0, None)],
            ..Default::default()
        };
        let partial = PartialMetrics::from_meta(&meta, Utc::now(), week());

        assert_eq!(partial.ratio, None);
        assert_eq!(partial.out_of_budget, 1);
    }

    #[test]
    fn average_ratio_is_mean_of_project_ratios() {
        let mut aggregator = Aggregator::default();
        aggregator.add(&PartialMetrics {
            total_debit: 10.0,
            total_credit: 5.0,
            ratio: Some(0.5),
            ..Default::default()
        });
        aggregator.add(&PartialMetrics {
            total_debit: 4.0,
            total_credit: 8.0,
            out_of_budget: 1,
            ratio: Some(2.0),
            ..Default::default()
        });
        aggregator.add(&PartialMetrics::default());

        assert_eq!(aggregator.received(), 3);
        let dashboard = aggregator.finish(3, 0);
        assert_eq!(dashboard.avg_credit_over_debit, 1.25);
        // total credit / total debit would be 13 / 14
        assert_eq!(dashboard.total_debit, 14.0);
        assert_eq!(dashboard.total_credit, 13.0);
        assert_eq!(dashboard.out_of_budget, 1);
    }
}

use crate::store::model::Record;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month, displayed and parsed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Month> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Month::of)
    }

    pub fn of(date: NaiveDate) -> Month {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Month::of(date) == *self
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || format!("'{s}' is not a YYYY-MM month");
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year = year.parse().map_err(|_| err())?;
        let month = month.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: Month,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub transactions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub expense: f64,
    pub pct: f64,
}

/// Months with at least one record, most recent first.
pub fn distinct_months(records: &[Record]) -> Vec<Month> {
    let mut months: Vec<Month> = records.iter().map(|r| Month::of(r.date)).collect();
    months.sort_by(|a, b| b.cmp(a));
    months.dedup();
    months
}

/// The month shown when none was picked.
pub fn default_month(records: &[Record]) -> Option<Month> {
    records.iter().map(|r| Month::of(r.date)).max()
}

/// Income, expense and balance for `month`. Returns `None` when there are no
/// records at all, as opposed to a zeroed summary for a month with no records.
pub fn summarize(records: &[Record], month: Month) -> Option<MonthSummary> {
    if records.is_empty() {
        return None;
    }
    let in_month: Vec<&Record> = records.iter().filter(|r| month.contains(r.date)).collect();
    // Folding from 0.0 keeps empty totals at +0.0; `f64::sum` starts at -0.0.
    let income = in_month
        .iter()
        .filter(|r| r.is_income())
        .fold(0.0, |total, r| total + r.amount);
    let expense = in_month
        .iter()
        .filter(|r| r.is_expense())
        .fold(0.0, |total, r| total - r.amount);
    Some(MonthSummary {
        month,
        income,
        expense,
        balance: income - expense,
        transactions: in_month.len(),
    })
}

/// Expenses in `month` grouped by category, as positive totals. Categories
/// without expenses are absent.
pub fn category_breakdown(records: &[Record], month: Month) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.is_expense() && month.contains(r.date))
    {
        *totals.entry(record.category.clone()).or_insert(0.0) += record.amount;
    }
    totals.into_iter().map(|(c, sum)| (c, sum.abs())).collect()
}

/// Largest share first; each share is a percentage of the month's expenses.
pub fn category_shares(breakdown: &BTreeMap<String, f64>) -> Vec<CategoryShare> {
    let total: f64 = breakdown.values().sum();
    let mut shares: Vec<CategoryShare> = breakdown
        .iter()
        .map(|(category, expense)| CategoryShare {
            category: category.clone(),
            expense: *expense,
            pct: if total > 0.0 {
                expense / total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    // Stable, so equal amounts stay in category order.
    shares.sort_by(|a, b| b.expense.total_cmp(&a.expense));
    shares
}

#[cfg(test)]
mod aggregate_tests {
    use super::*;
    use crate::output::format::ToOutputFormat;
    use crate::store::open_testing_store;
    use crate::store::testing::insert_test_data;

    fn june() -> Month {
        Month::new(2024, 6).unwrap()
    }

    fn record(date: &str, amount: &str, category: &str) -> Record {
        Record::create(date, amount, category, "").unwrap()
    }

    #[test]
    fn month_display_and_parse() {
        assert_eq!(june().to_string(), "2024-06");
        assert_eq!("2024-06".parse::<Month>().unwrap(), june());
        assert_eq!("0999-12".parse::<Month>().unwrap().to_string(), "0999-12");
        for bad in ["2024-13", "2024-6", "24-06", "2024/06", "june", ""] {
            assert!(bad.parse::<Month>().is_err(), "{bad}");
        }
    }

    #[test]
    fn month_ordering() {
        assert!(Month::new(2024, 1).unwrap() > Month::new(2023, 12).unwrap());
        assert!(Month::new(2024, 10).unwrap() > Month::new(2024, 9).unwrap());
    }

    #[test]
    fn distinct_months_most_recent_first() {
        let records = vec![
            record("2024-06-05", "-1", "Food"),
            record("2023-12-31", "-1", "Food"),
            record("2024-07-01", "-1", "Food"),
            record("2024-06-20", "-1", "Food"),
        ];
        let months: Vec<String> = distinct_months(&records)
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2024-07", "2024-06", "2023-12"]);
        assert_eq!(default_month(&records), Month::new(2024, 7));
    }

    #[test]
    fn empty_store() {
        assert!(distinct_months(&[]).is_empty());
        assert_eq!(default_month(&[]), None);
        assert_eq!(summarize(&[], june()), None);
        assert!(category_breakdown(&[], june()).is_empty());
    }

    #[test]
    fn june_scenario() {
        let mut store = open_testing_store();
        insert_test_data(&mut store);

        let summary = summarize(store.all(), june()).unwrap();
        assert_eq!(summary.income, 1000.0);
        assert_eq!(summary.expense, 250.0);
        assert_eq!(summary.balance, 750.0);
        assert_eq!(summary.transactions, 3);

        let breakdown = category_breakdown(store.all(), june());
        assert_eq!(
            breakdown,
            BTreeMap::from([("Food".to_string(), 250.0)])
        );
    }

    #[test]
    fn july_scenario() {
        let mut store = open_testing_store();
        insert_test_data(&mut store);
        let july = Month::new(2024, 7).unwrap();

        let summary = summarize(store.all(), july).unwrap();
        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.expense, 30.0);
        assert_eq!(summary.balance, -30.0);
        assert_eq!(
            category_breakdown(store.all(), july),
            BTreeMap::from([("Transport".to_string(), 30.0)])
        );
    }

    #[test]
    fn month_without_records_is_zeroed() {
        let mut store = open_testing_store();
        insert_test_data(&mut store);
        let summary = summarize(store.all(), Month::new(2020, 1).unwrap()).unwrap();
        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.expense, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.transactions, 0);
    }

    #[test]
    fn empty_totals_are_positive_zero() {
        let mut store = open_testing_store();
        insert_test_data(&mut store);

        let july = summarize(store.all(), Month::new(2024, 7).unwrap()).unwrap();
        assert!(july.income.is_sign_positive());
        assert_eq!(july.income.to_output_format(), "0.00");

        let empty = summarize(store.all(), Month::new(2020, 1).unwrap()).unwrap();
        for total in [empty.income, empty.expense, empty.balance] {
            assert!(total.is_sign_positive());
            assert_eq!(total.to_output_format(), "0.00");
        }
    }

    #[test]
    fn zero_amounts_are_ignored() {
        let records = vec![
            record("2024-06-01", "0", "Bills"),
            record("2024-06-02", "-10", "Food"),
            record("2024-06-03", "5", "Income"),
        ];
        let summary = summarize(&records, june()).unwrap();
        assert_eq!(summary.income, 5.0);
        assert_eq!(summary.expense, 10.0);
        assert_eq!(summary.transactions, 3);
        let breakdown = category_breakdown(&records, june());
        assert!(!breakdown.contains_key("Bills"));
        assert!(!breakdown.contains_key("Income"));
    }

    #[test]
    fn breakdown_groups_and_filters_by_month() {
        let records = vec![
            record("2024-06-01", "-10", "Food"),
            record("2024-06-02", "-2.5", "Food"),
            record("2024-06-03", "-7", "Fun stuff"),
            record("2024-05-31", "-100", "Food"),
            record("2024-06-04", "20", "Food"),
        ];
        let breakdown = category_breakdown(&records, june());
        assert_eq!(
            breakdown,
            BTreeMap::from([("Food".to_string(), 12.5), ("Fun stuff".to_string(), 7.0)])
        );
    }

    #[test]
    fn shares() {
        let breakdown = BTreeMap::from([
            ("Bills".to_string(), 25.0),
            ("Food".to_string(), 50.0),
            ("Transport".to_string(), 25.0),
        ]);
        let shares = category_shares(&breakdown);
        let names: Vec<_> = shares.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Food", "Bills", "Transport"]);
        assert_eq!(shares[0].pct, 50.0);
        assert_eq!(shares[1].pct, 25.0);
        assert!(category_shares(&BTreeMap::new()).is_empty());
    }
}

use crate::aggregate::Month;
use crate::store::model::DATE_FORMAT;
use chrono::NaiveDate;

pub trait ToOutputFormat {
    fn to_output_format(&self) -> String;
}

impl ToOutputFormat for str {
    fn to_output_format(&self) -> String {
        self.to_string()
    }
}

impl ToOutputFormat for String {
    fn to_output_format(&self) -> String {
        self.clone()
    }
}

impl ToOutputFormat for NaiveDate {
    fn to_output_format(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }
}

impl ToOutputFormat for Month {
    fn to_output_format(&self) -> String {
        self.to_string()
    }
}

impl ToOutputFormat for usize {
    fn to_output_format(&self) -> String {
        self.to_string()
    }
}

// Amounts and percentages alike.
impl ToOutputFormat for f64 {
    fn to_output_format(&self) -> String {
        format!("{:.02}", self)
    }
}

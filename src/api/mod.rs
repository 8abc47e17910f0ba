pub mod account;
pub mod attendance;
pub mod branch;
pub mod cash_advance;
pub mod leave_request;
pub mod pay_rate;
pub mod payroll_item;
pub mod payroll_period;
pub mod schedule;
pub mod user;

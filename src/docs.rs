use crate::api::account::{AccountQuery, CreateAccount};
use crate::api::attendance::{AttendanceQuery, CreateAttendance, UpdateAttendance};
use crate::api::branch::{CreateBranch, UpdateBranch};
use crate::api::cash_advance::{CashAdvanceQuery, CreateCashAdvance, UpdateCashAdvance};
use crate::api::leave_request::{CreateLeave, LeaveFilter, UpdateLeave};
use crate::api::pay_rate::{CreatePayRate, PayRateQuery, UpdatePayRate};
use crate::api::payroll_item::{
    CreatePayrollItem, GeneratePayroll, PayrollItemQuery, UpdatePayrollItem,
};
use crate::api::payroll_period::{CreatePayrollPeriod, UpdatePayrollPeriod};
use crate::api::schedule::{CreateSchedule, ScheduleQuery, UpdateSchedule};
use crate::api::user::{UpdateUser, UserResponse};
use crate::model::account::Account;
use crate::model::attendance::Attendance;
use crate::model::branch::Branch;
use crate::model::cash_advance::CashAdvance;
use crate::model::leave_request::LeaveRequest;
use crate::model::pay_rate::PayRate;
use crate::model::payroll_item::PayrollItem;
use crate::model::payroll_period::PayrollPeriod;
use crate::model::schedule::Schedule;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "HR Payroll API",
        version = "1.0.0",
        description = r#"
## HR / Payroll Administration Backend

Internal REST backend for branch, account, schedule, attendance, leave and
payroll administration.

### Key Features
- **Accounts & Branches** - employee directory with soft deactivation
- **Schedules & Attendance** - expected vs actual punches, with derived
  late/undertime/overtime minutes
- **Leave Management** - advance-notice and overlap validation with an
  approval workflow
- **Payroll** - periods, per-account pay rates, cash advances and one-click
  payroll generation

### Security
All non-auth endpoints require a **JWT Bearer** token. Payroll and
administration endpoints are restricted to privileged roles.

Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::branch::create_branch,
        crate::api::branch::list_branches,
        crate::api::branch::get_branch,
        crate::api::branch::update_branch,
        crate::api::branch::delete_branch,

        crate::api::account::create_account,
        crate::api::account::list_accounts,
        crate::api::account::get_account,
        crate::api::account::update_account,
        crate::api::account::delete_account,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::schedule::create_schedule,
        crate::api::schedule::list_schedules,
        crate::api::schedule::get_schedule,
        crate::api::schedule::update_schedule,
        crate::api::schedule::delete_schedule,

        crate::api::attendance::create_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,

        crate::api::pay_rate::create_pay_rate,
        crate::api::pay_rate::list_pay_rates,
        crate::api::pay_rate::get_pay_rate,
        crate::api::pay_rate::update_pay_rate,
        crate::api::pay_rate::delete_pay_rate,

        crate::api::cash_advance::create_cash_advance,
        crate::api::cash_advance::list_cash_advances,
        crate::api::cash_advance::get_cash_advance,
        crate::api::cash_advance::update_cash_advance,
        crate::api::cash_advance::delete_cash_advance,

        crate::api::payroll_period::create_period,
        crate::api::payroll_period::list_periods,
        crate::api::payroll_period::get_period,
        crate::api::payroll_period::update_period,
        crate::api::payroll_period::delete_period,

        crate::api::payroll_item::create_item,
        crate::api::payroll_item::list_items,
        crate::api::payroll_item::get_item,
        crate::api::payroll_item::update_item,
        crate::api::payroll_item::delete_item,
        crate::api::payroll_item::generate_payroll,
    ),
    components(
        schemas(
            Branch,
            CreateBranch,
            UpdateBranch,
            Account,
            CreateAccount,
            AccountQuery,
            UserResponse,
            UpdateUser,
            Schedule,
            CreateSchedule,
            UpdateSchedule,
            ScheduleQuery,
            Attendance,
            CreateAttendance,
            UpdateAttendance,
            AttendanceQuery,
            LeaveRequest,
            CreateLeave,
            UpdateLeave,
            LeaveFilter,
            PayRate,
            CreatePayRate,
            UpdatePayRate,
            PayRateQuery,
            CashAdvance,
            CreateCashAdvance,
            UpdateCashAdvance,
            CashAdvanceQuery,
            PayrollPeriod,
            CreatePayrollPeriod,
            UpdatePayrollPeriod,
            PayrollItem,
            CreatePayrollItem,
            UpdatePayrollItem,
            PayrollItemQuery,
            GeneratePayroll
        )
    ),
    tags(
        (name = "Branches", description = "Branch management APIs"),
        (name = "Accounts", description = "Employee account APIs"),
        (name = "Users", description = "Login management APIs"),
        (name = "Schedules", description = "Expected working hours APIs"),
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Leave", description = "Leave request APIs"),
        (name = "PayRates", description = "Per-account pay rate APIs"),
        (name = "CashAdvances", description = "Cash advance APIs"),
        (name = "PayrollPeriods", description = "Payroll period APIs"),
        (name = "PayrollItems", description = "Payroll item and generation APIs"),
    )
)]
pub struct ApiDoc;

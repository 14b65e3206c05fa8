pub mod agenda_event;
pub mod announcement;
pub mod dept_message;
pub mod finance_entry;
pub mod notification;
pub mod sale;
pub mod seller_kpi;
pub mod task;
pub mod task_history;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::agenda_event::{self, Entity as AgendaEvent};
    pub use super::announcement::{self, Entity as Announcement};
    pub use super::dept_message::{self, Entity as DeptMessage};
    pub use super::finance_entry::{self, Entity as FinanceEntry};
    pub use super::notification::{self, Entity as Notification};
    pub use super::sale::{self, Entity as Sale};
    pub use super::seller_kpi::{self, Entity as SellerKpi};
    pub use super::task::{self, Entity as Task};
    pub use super::task_history::{self, Entity as TaskHistory};
    pub use super::user::{self, Entity as User};
}

pub mod attendance;
pub mod lookup;
pub mod record;
pub mod validation;
pub mod work_order;
pub mod worker;

use serde::Serialize;

use super::{expect_category, App, AppError, WorkerKey};
use crate::db;
use crate::domain::lookup::category;
use crate::domain::work_order::{
    WorkAssignment, WorkOrder, WorkOrderSummary, WorkerRequest,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkOrderView {
    #[serde(flatten)]
    pub order: WorkOrder,
    pub status_text: String,
    pub assignments: Vec<WorkAssignment>,
    pub requests: Vec<WorkerRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub work_order_id: i64,
    pub skill_id: i64,
    pub hours: i64,
    pub hourly_wage: f64,
    pub description: Option<String>,
}

impl App {
    pub fn create_work_order(&self, mut order: WorkOrder) -> Result<WorkOrder, AppError> {
        order.record = self.new_record()?;
        order.validate()?;
        let snapshot = self.lookups()?;
        expect_category(&snapshot, order.status, category::ORDER_STATUS)?;
        expect_category(&snapshot, order.type_of_work_id, category::WORK_TYPE)?;
        expect_category(&snapshot, order.transport_method_id, category::TRANSPORT_METHOD)?;
        if db::get_employer(&self.conn, order.employer_id)?.is_none() {
            return Err(AppError::NotFound(format!("employer {}", order.employer_id)));
        }
        order.record.id = db::insert_work_order(&self.conn, &order)?;
        tracing::info!(
            id = order.record.id,
            employer_id = order.employer_id,
            when = %order.date_time_of_work,
            "created work order"
        );
        Ok(order)
    }

    pub fn show_work_order(&self, id: i64) -> Result<WorkOrderView, AppError> {
        let order = self.require_order(id)?;
        let status_text = self
            .lookups()?
            .by_id(order.status, self.locale())?
            .to_string();
        let assignments = db::list_assignments_for_order(&self.conn, id)?;
        let requests = db::list_worker_requests(&self.conn, id)?;
        Ok(WorkOrderView {
            order,
            status_text,
            assignments,
            requests,
        })
    }

    pub fn list_work_orders(&self, date: Option<&str>) -> Result<Vec<WorkOrder>, AppError> {
        let day = date
            .map(crate::dates::parse_date)
            .transpose()?
            .map(crate::dates::format_date);
        Ok(db::list_work_orders(&self.conn, day.as_deref())?)
    }

    pub fn set_order_status(&self, id: i64, status: i64) -> Result<WorkOrder, AppError> {
        expect_category(&*self.lookups()?, status, category::ORDER_STATUS)?;
        let mut order = self.require_order(id)?;
        order.record = self.touched(&order.record)?;
        db::update_work_order_status(&self.conn, id, status, &order.record)?;
        order.status = status;
        tracing::info!(id, status, "work order status changed");
        Ok(order)
    }

    pub fn cancel_work_order(&self, id: i64) -> Result<WorkOrder, AppError> {
        let cancelled = self.lookups()?.well_known().order_status.cancelled;
        self.set_order_status(id, cancelled)
    }

    pub fn work_order_summary(&self) -> Result<Vec<WorkOrderSummary>, AppError> {
        Ok(db::work_order_summary(&self.conn)?)
    }

    pub fn create_assignment(&self, input: NewAssignment) -> Result<WorkAssignment, AppError> {
        self.require_order(input.work_order_id)?;
        self.lookups()?.get_by_skill_id(input.skill_id)?;
        let mut assignment = WorkAssignment {
            record: self.new_record()?,
            work_order_id: input.work_order_id,
            worker_assigned_id: None,
            worker_signin_id: None,
            skill_id: input.skill_id,
            hours: input.hours,
            hourly_wage: input.hourly_wage,
            description: input.description,
        };
        assignment.validate()?;
        assignment.record.id = db::insert_assignment(&self.conn, &assignment)?;
        Ok(assignment)
    }

    pub fn list_assignments(&self, work_order_id: i64) -> Result<Vec<WorkAssignment>, AppError> {
        self.require_order(work_order_id)?;
        Ok(db::list_assignments_for_order(&self.conn, work_order_id)?)
    }

    /// Puts the worker holding `dwccardnum` on an open assignment. The worker
    /// must have signed in on the day of the work unless `force` is set, and
    /// may hold only one assignment per day.
    pub fn dispatch(
        &self,
        assignment_id: i64,
        dwccardnum: i64,
        force: bool,
    ) -> Result<WorkAssignment, AppError> {
        let mut assignment = self.require_assignment(assignment_id)?;
        if let Some(current) = assignment.worker_assigned_id {
            return Err(AppError::Conflict(format!(
                "assignment {assignment_id} is already dispatched to worker {current}"
            )));
        }
        let worker = self.require_worker(WorkerKey::Card(dwccardnum))?;
        let order = self.require_order(assignment.work_order_id)?;
        let day = order.work_date().to_string();

        if let Some(other) = db::worker_assignment_on_day(&self.conn, worker.record.id, &day)? {
            return Err(AppError::Conflict(format!(
                "worker with card {dwccardnum} already holds assignment {other} on {day}"
            )));
        }

        let signin = db::find_signin_for_day(&self.conn, dwccardnum, &day)?;
        if signin.is_none() && !force {
            return Err(AppError::InvalidArgument(format!(
                "worker with card {dwccardnum} has not signed in on {day}; use --force to dispatch anyway"
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        assignment.record = self.touched(&assignment.record)?;
        assignment.worker_assigned_id = Some(worker.record.id);
        assignment.worker_signin_id = signin.as_ref().map(|signin| signin.record.id);
        db::set_assignment_worker(
            &tx,
            assignment_id,
            assignment.worker_assigned_id,
            assignment.worker_signin_id,
            &assignment.record,
        )?;
        if let Some(signin) = signin.as_ref() {
            let record = self.touched(&signin.record)?;
            db::set_signin_assignment(&tx, signin.record.id, Some(assignment_id), &record)?;
        }
        tx.commit()?;

        tracing::info!(
            assignment_id,
            dwccardnum,
            forced = force && signin.is_none(),
            "dispatched worker"
        );
        Ok(assignment)
    }

    pub fn unassign(&self, assignment_id: i64) -> Result<WorkAssignment, AppError> {
        let mut assignment = self.require_assignment(assignment_id)?;
        if assignment.worker_assigned_id.is_none() {
            return Err(AppError::InvalidArgument(format!(
                "assignment {assignment_id} has no worker"
            )));
        }
        let tx = self.conn.unchecked_transaction()?;
        if let Some(signin_id) = assignment.worker_signin_id {
            if let Some(signin) = db::get_worker_signin(&tx, signin_id)? {
                let record = self.touched(&signin.record)?;
                db::set_signin_assignment(&tx, signin_id, None, &record)?;
            }
        }
        assignment.record = self.touched(&assignment.record)?;
        assignment.worker_assigned_id = None;
        assignment.worker_signin_id = None;
        db::set_assignment_worker(&tx, assignment_id, None, None, &assignment.record)?;
        tx.commit()?;
        tracing::info!(assignment_id, "unassigned worker");
        Ok(assignment)
    }

    pub fn add_worker_request(
        &self,
        work_order_id: i64,
        dwccardnum: i64,
    ) -> Result<WorkerRequest, AppError> {
        self.require_order(work_order_id)?;
        let worker = self.require_worker(WorkerKey::Card(dwccardnum))?;
        let existing = db::list_worker_requests(&self.conn, work_order_id)?;
        if existing.iter().any(|request| request.worker_id == worker.record.id) {
            return Err(AppError::Conflict(format!(
                "worker with card {dwccardnum} is already requested on order {work_order_id}"
            )));
        }
        let mut request = WorkerRequest {
            record: self.new_record()?,
            work_order_id,
            worker_id: worker.record.id,
        };
        request.record.id = db::insert_worker_request(&self.conn, &request)?;
        Ok(request)
    }

    fn require_order(&self, id: i64) -> Result<WorkOrder, AppError> {
        db::get_work_order(&self.conn, id)?
            .ok_or_else(|| AppError::NotFound(format!("work order {id}")))
    }

    fn require_assignment(&self, id: i64) -> Result<WorkAssignment, AppError> {
        db::get_assignment(&self.conn, id)?
            .ok_or_else(|| AppError::NotFound(format!("work assignment {id}")))
    }
}

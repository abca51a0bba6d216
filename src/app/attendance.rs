use serde::Serialize;

use super::{expect_category, skill_codes, App, AppError, WorkerKey};
use crate::dates::{format_date, format_datetime, now_datetime, parse_date, parse_datetime, today};
use crate::db;
use crate::domain::attendance::{Activity, ActivitySignin, Event, WorkerSignin};
use crate::domain::lookup::category;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SigninOutcome {
    pub signin: WorkerSignin,
    pub full_name: String,
    pub member_expired: bool,
    pub member_inactive: bool,
    pub member_sanctioned: bool,
    pub member_expelled: bool,
    pub expiration_date: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum LotteryOutcome {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NO_WSI_REC")]
    NoSigninRecord,
}

impl LotteryOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            LotteryOutcome::Ok => "OK",
            LotteryOutcome::NoSigninRecord => "NO_WSI_REC",
        }
    }
}

/// One row of the day's sign-in board.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SigninView {
    pub id: i64,
    pub dwccardnum: i64,
    pub full_name: String,
    pub date_for_signin: String,
    pub lottery_timestamp: Option<String>,
    pub work_assignment_id: Option<i64>,
    pub member_status: String,
    pub member_expired: bool,
    pub member_inactive: bool,
    pub member_sanctioned: bool,
    pub member_expelled: bool,
    pub expiration_date: String,
    pub skills: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub event_type: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub notes: Option<String>,
}

impl App {
    /// Signs a card in for the day of `when` (default: now). A card may sign
    /// in once per day.
    pub fn sign_in(&self, dwccardnum: i64, when: Option<&str>) -> Result<SigninOutcome, AppError> {
        let at = match when {
            Some(raw) => parse_datetime(raw)?,
            None => now_datetime(),
        };
        let day = format_date(at.date());
        let worker = self.require_worker(WorkerKey::Card(dwccardnum))?;

        if let Some(existing) = db::find_signin_for_day(&self.conn, dwccardnum, &day)? {
            return Err(AppError::Conflict(format!(
                "card {dwccardnum} already signed in on {day} (sign-in {})",
                existing.record.id
            )));
        }

        let mut signin = WorkerSignin {
            record: self.new_record()?,
            dwccardnum,
            date_for_signin: format_datetime(at),
            lottery_timestamp: None,
            work_assignment_id: None,
        };
        signin.record.id = db::insert_worker_signin(&self.conn, &signin)?;

        let ids = self.lookups()?.well_known().member_status;
        let expires = parse_date(&worker.member_expiration_date)?;
        let outcome = SigninOutcome {
            full_name: worker.full_name(),
            member_expired: expires < today(),
            member_inactive: worker.member_status == ids.inactive,
            member_sanctioned: worker.member_status == ids.sanctioned,
            member_expelled: worker.member_status == ids.expelled,
            expiration_date: worker.member_expiration_date,
            signin,
        };
        tracing::info!(
            dwccardnum,
            day = %day,
            expired = outcome.member_expired,
            "worker signed in"
        );
        Ok(outcome)
    }

    /// Stamps the lottery time on the card's sign-in for `date`, leaving an
    /// existing stamp untouched.
    pub fn lottery_signin(&self, dwccardnum: i64, date: &str) -> Result<LotteryOutcome, AppError> {
        let day = format_date(parse_datetime(date)?.date());
        let Some(signin) = db::find_signin_for_day(&self.conn, dwccardnum, &day)? else {
            tracing::warn!(dwccardnum, day = %day, "lottery for card without sign-in");
            return Ok(LotteryOutcome::NoSigninRecord);
        };
        if signin.lottery_timestamp.is_none() {
            let record = self.touched(&signin.record)?;
            db::set_lottery_timestamp(
                &self.conn,
                signin.record.id,
                &format_datetime(now_datetime()),
                &record,
            )?;
        }
        Ok(LotteryOutcome::Ok)
    }

    pub fn delete_signin(&self, id: i64) -> Result<(), AppError> {
        let signin = db::get_worker_signin(&self.conn, id)?
            .ok_or_else(|| AppError::NotFound(format!("sign-in {id}")))?;
        if let Some(assignment_id) = signin.work_assignment_id {
            return Err(AppError::Conflict(format!(
                "sign-in {id} is linked to assignment {assignment_id}; unassign it first"
            )));
        }
        db::delete_worker_signin(&self.conn, id)?;
        Ok(())
    }

    pub fn list_signins(&self, date: &str) -> Result<Vec<SigninView>, AppError> {
        let day = format_date(parse_date(date)?);
        let snapshot = self.lookups()?;
        let ids = snapshot.well_known().member_status;
        let mut views = Vec::new();
        for signin in db::list_signins_for_day(&self.conn, &day)? {
            let worker = self.require_worker(WorkerKey::Card(signin.dwccardnum))?;
            views.push(SigninView {
                id: signin.record.id,
                dwccardnum: signin.dwccardnum,
                full_name: worker.full_name(),
                member_status: snapshot.by_id(worker.member_status, self.locale())?.to_string(),
                member_expired: worker.member_expiration_date.as_str() < signin.signin_date(),
                member_inactive: worker.member_status == ids.inactive,
                member_sanctioned: worker.member_status == ids.sanctioned,
                member_expelled: worker.member_status == ids.expelled,
                skills: skill_codes(&snapshot, worker.english_level, worker.skills())?,
                expiration_date: worker.member_expiration_date,
                date_for_signin: signin.date_for_signin,
                lottery_timestamp: signin.lottery_timestamp,
                work_assignment_id: signin.work_assignment_id,
            });
        }
        Ok(views)
    }

    pub fn create_activity(&self, mut activity: Activity) -> Result<Activity, AppError> {
        activity.record = self.new_record()?;
        activity.validate()?;
        expect_category(&*self.lookups()?, activity.name_id, category::ACTIVITY_NAME)?;
        activity.date_start = format_datetime(parse_datetime(&activity.date_start)?);
        activity.date_end = format_datetime(parse_datetime(&activity.date_end)?);
        activity.record.id = db::insert_activity(&self.conn, &activity)?;
        Ok(activity)
    }

    pub fn list_activities(&self, date: Option<&str>) -> Result<Vec<Activity>, AppError> {
        let day = date.map(parse_date).transpose()?.map(format_date);
        Ok(db::list_activities(&self.conn, day.as_deref())?)
    }

    pub fn list_activity_signins(&self, activity_id: i64) -> Result<Vec<ActivitySignin>, AppError> {
        self.require_activity(activity_id)?;
        Ok(db::list_activity_signins(&self.conn, activity_id)?)
    }

    /// Records attendance of a card at a class. Cards without a member record
    /// are accepted with no person attached.
    pub fn activity_signin(
        &self,
        activity_id: i64,
        dwccardnum: i64,
        when: Option<&str>,
    ) -> Result<ActivitySignin, AppError> {
        let activity = self.require_activity(activity_id)?;
        if db::activity_signin_exists(&self.conn, activity_id, dwccardnum)? {
            return Err(AppError::Conflict(format!(
                "card {dwccardnum} already signed in to activity {activity_id}"
            )));
        }
        let person_id = db::get_worker_by_card(&self.conn, dwccardnum)?.map(|worker| worker.record.id);
        if person_id.is_none() {
            tracing::warn!(dwccardnum, activity_id, "activity sign-in for unregistered card");
        }
        let date_for_signin = match when {
            Some(raw) => format_datetime(parse_datetime(raw)?),
            None => activity.date_start.clone(),
        };
        let mut signin = ActivitySignin {
            record: self.new_record()?,
            activity_id,
            dwccardnum,
            person_id,
            date_for_signin,
        };
        signin.record.id = db::insert_activity_signin(&self.conn, &signin)?;
        Ok(signin)
    }

    pub fn create_event(
        &self,
        worker: WorkerKey,
        event_type: i64,
        date_from: &str,
        date_to: Option<&str>,
        notes: Option<&str>,
    ) -> Result<EventView, AppError> {
        let person = self.require_worker(worker)?;
        let snapshot = self.lookups()?;
        expect_category(&snapshot, event_type, category::EVENT_TYPE)?;
        let mut event = Event {
            record: self.new_record()?,
            person_id: person.record.id,
            event_type,
            date_from: date_from.trim().to_string(),
            date_to: date_to.map(|value| value.trim().to_string()),
            notes: notes.map(str::to_string),
        };
        event.validate()?;
        event.record.id = db::insert_event(&self.conn, &event)?;
        self.event_view(event)
    }

    pub fn edit_event(&self, id: i64, patch: EventPatch) -> Result<EventView, AppError> {
        let mut event = self.require_event(id)?;
        if let Some(event_type) = patch.event_type {
            expect_category(&*self.lookups()?, event_type, category::EVENT_TYPE)?;
            event.event_type = event_type;
        }
        if let Some(date_from) = patch.date_from {
            event.date_from = date_from;
        }
        if let Some(date_to) = patch.date_to {
            event.date_to = Some(date_to);
        }
        if let Some(notes) = patch.notes {
            event.notes = Some(notes);
        }
        event.validate()?;
        event.record = self.touched(&event.record)?;
        db::update_event(&self.conn, &event)?;
        self.event_view(event)
    }

    pub fn delete_event(&self, id: i64) -> Result<(), AppError> {
        self.require_event(id)?;
        db::delete_event(&self.conn, id)?;
        Ok(())
    }

    pub fn list_events(&self, worker: WorkerKey) -> Result<Vec<EventView>, AppError> {
        let person = self.require_worker(worker)?;
        db::list_events_for_person(&self.conn, person.record.id)?
            .into_iter()
            .map(|event| self.event_view(event))
            .collect()
    }

    fn event_view(&self, event: Event) -> Result<EventView, AppError> {
        let type_text = self.lookups()?.by_id(event.event_type, self.locale())?.to_string();
        let day = event.date_from.get(..10).unwrap_or(&event.date_from);
        let label = format!("{day} {type_text}");
        Ok(EventView { event, label })
    }

    fn require_activity(&self, id: i64) -> Result<Activity, AppError> {
        db::get_activity(&self.conn, id)?
            .ok_or_else(|| AppError::NotFound(format!("activity {id}")))
    }

    fn require_event(&self, id: i64) -> Result<Event, AppError> {
        db::get_event(&self.conn, id)?.ok_or_else(|| AppError::NotFound(format!("event {id}")))
    }
}

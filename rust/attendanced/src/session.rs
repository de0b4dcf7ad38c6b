use crate::catalog;
use crate::identity::{self, Identity};
use crate::ledger::{self, AttendanceBand, AttendanceLedger, MAX_WEEKS};
use crate::navigation::{InvalidTransition, NavState, Screen};
use crate::roster::{self, Course, Student};
use crate::store::KvStore;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{message}")]
    Validation {
        message: String,
        missing: Vec<&'static str>,
    },
    #[error("No registry found for this course code. Please use the registration option.")]
    NoIdentity,
    #[error("Authentication failed. Check the course code and security key.")]
    AuthFailed,
    #[error("no lecturer is signed in")]
    NotAuthenticated,
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Validation { .. } => "validation_failed",
            SessionError::NoIdentity => "no_identity",
            SessionError::AuthFailed => "auth_failed",
            SessionError::NotAuthenticated => "not_authenticated",
            SessionError::InvalidTransition(_) => "invalid_transition",
            SessionError::NotFound { .. } => "not_found",
            SessionError::Storage(_) => "storage_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::Validation { missing, .. } => Some(json!({ "missing": missing })),
            SessionError::InvalidTransition(t) => {
                Some(json!({ "screen": t.from, "action": t.action }))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Artificial latency before a commit writes anything.
    pub save_delay: Duration,
    /// Fixed roster seed; `None` draws names from ambient randomness.
    pub roster_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    #[serde(flatten)]
    pub student: Student,
    pub weeks: u8,
    pub percent: u8,
    pub band: AttendanceBand,
    pub marked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    pub course: Course,
    pub department_name: String,
    pub max_weeks: u8,
    pub marked_count: usize,
    pub rows: Vec<AttendanceRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub course_id: String,
    pub committed_at: String,
    pub present: usize,
    pub absent: usize,
    pub weeks: BTreeMap<String, u8>,
}

/// One lecturer session: who is signed in, where they are in the
/// drill-down, and the attendance view they have open.
pub struct Session {
    store: Box<dyn KvStore>,
    options: SessionOptions,
    nav: NavState,
    user: Option<Identity>,
    session_id: Option<Uuid>,
    roster: Vec<Student>,
    pending: BTreeSet<String>,
}

impl Session {
    pub fn new(store: Box<dyn KvStore>, options: SessionOptions) -> Self {
        Self {
            store,
            options,
            nav: NavState::default(),
            user: None,
            session_id: None,
            roster: Vec::new(),
            pending: BTreeSet::new(),
        }
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn screen(&self) -> Screen {
        self.nav.screen()
    }

    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn require_auth(&self) -> Result<(), SessionError> {
        if self.user.is_some() {
            Ok(())
        } else {
            Err(SessionError::NotAuthenticated)
        }
    }

    fn begin(&mut self, identity: Identity) {
        let id = Uuid::new_v4();
        info!(username = %identity.username, session_id = %id, "lecturer session started");
        self.user = Some(identity);
        self.session_id = Some(id);
        self.close_attendance_view();
        self.nav.authenticated();
    }

    fn close_attendance_view(&mut self) {
        self.roster.clear();
        self.pending.clear();
    }

    pub fn toggle_auth_mode(&mut self) -> Result<Screen, SessionError> {
        self.nav.toggle_auth_mode()?;
        Ok(self.nav.screen())
    }

    /// Stores a new identity record, replacing any previous one, and signs
    /// it in. Allowed from any screen.
    pub fn register(
        &mut self,
        full_name: &str,
        course_code: &str,
        passphrase: &str,
    ) -> Result<&Identity, SessionError> {
        let identity = identity::register(self.store.as_mut(), full_name, course_code, passphrase)?;
        self.begin(identity);
        self.require_user()
    }

    pub fn login(&mut self, course_code: &str, passphrase: &str) -> Result<&Identity, SessionError> {
        if self.nav.is_authenticated() {
            return Err(self.nav.reject("log in").into());
        }
        let identity = identity::authenticate(self.store.as_ref(), course_code, passphrase)?;
        self.begin(identity);
        self.require_user()
    }

    fn require_user(&self) -> Result<&Identity, SessionError> {
        self.user.as_ref().ok_or(SessionError::NotAuthenticated)
    }

    /// Clears identity and every selection. Returns whether anyone was
    /// signed in.
    pub fn logout(&mut self) -> bool {
        let was_signed_in = self.user.take().is_some();
        if let Some(id) = self.session_id.take() {
            info!(session_id = %id, "lecturer session ended");
        }
        self.close_attendance_view();
        self.nav.logout();
        was_signed_in
    }

    /// Implicit logout after inactivity.
    pub fn expire(&mut self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        info!("session expired after inactivity");
        self.logout()
    }

    pub fn select_college(&mut self, college_id: &str) -> Result<(), SessionError> {
        self.require_auth()?;
        if catalog::college(college_id).is_none() {
            return Err(SessionError::NotFound {
                what: "college",
                id: college_id.to_string(),
            });
        }
        self.nav.select_college(college_id)?;
        debug!(college_id, "college selected");
        Ok(())
    }

    pub fn select_department(
        &mut self,
        department_id: &str,
        sub_department: Option<&str>,
    ) -> Result<(), SessionError> {
        self.require_auth()?;
        let NavState::Departments { college_id } = &self.nav else {
            return Err(self.nav.reject("select a department").into());
        };
        let department = catalog::college(college_id)
            .and_then(|c| c.department(department_id))
            .ok_or_else(|| SessionError::NotFound {
                what: "department",
                id: department_id.to_string(),
            })?;
        let selected = department
            .select(sub_department)
            .ok_or_else(|| SessionError::NotFound {
                what: "sub-department",
                id: sub_department.unwrap_or_default().to_string(),
            })?;
        debug!(department_id, name = %selected.name, "department selected");
        self.nav.select_department(selected)?;
        Ok(())
    }

    pub fn levels(&self) -> Result<Vec<u16>, SessionError> {
        self.require_auth()?;
        let department = self
            .nav
            .selections()
            .department
            .ok_or_else(|| self.nav.reject("list levels"))?;
        Ok(roster::offered_levels(department))
    }

    pub fn select_level(&mut self, level: u16) -> Result<(), SessionError> {
        self.require_auth()?;
        let NavState::Levels { department, .. } = &self.nav else {
            return Err(self.nav.reject("select a level").into());
        };
        if !roster::offered_levels(department).contains(&level) {
            return Err(SessionError::NotFound {
                what: "level",
                id: level.to_string(),
            });
        }
        self.nav.select_level(level)?;
        debug!(level, "level selected");
        Ok(())
    }

    pub fn courses(&self) -> Result<Vec<Course>, SessionError> {
        self.require_auth()?;
        let sel = self.nav.selections();
        match (sel.department, sel.level) {
            (Some(department), Some(level)) => {
                Ok(roster::generate_courses_for_level(department, level))
            }
            _ => Err(self.nav.reject("list courses").into()),
        }
    }

    pub fn select_course(&mut self, course_id: &str) -> Result<(), SessionError> {
        self.require_auth()?;
        let NavState::Courses {
            department, level, ..
        } = &self.nav
        else {
            return Err(self.nav.reject("select a course").into());
        };
        let course = roster::generate_courses_for_level(department, *level)
            .into_iter()
            .find(|c| c.id == course_id)
            .ok_or_else(|| SessionError::NotFound {
                what: "course",
                id: course_id.to_string(),
            })?;
        let roster = match self.options.roster_seed {
            Some(seed) => {
                let mut rng = roster::seeded_rng(&department.id, seed);
                roster::generate_students_with(&department.id, &mut rng)
            }
            None => roster::generate_students(&department.id),
        };

        self.nav.select_course(course)?;
        self.roster = roster;
        self.pending.clear();
        debug!(course_id, students = self.roster.len(), "attendance view opened");
        Ok(())
    }

    pub fn go_back(&mut self) -> Screen {
        let leaving_attendance = self.nav.screen() == Screen::Attendance;
        if self.nav.go_back() && leaving_attendance {
            self.close_attendance_view();
        }
        self.nav.screen()
    }

    fn open_course(&self, action: &'static str) -> Result<&Course, SessionError> {
        self.require_auth()?;
        match &self.nav {
            NavState::Attendance { course, .. } => Ok(course),
            _ => Err(self.nav.reject(action).into()),
        }
    }

    /// Flips a student in the pending "present this week" set. Returns the
    /// new mark.
    pub fn toggle_attendance(&mut self, student_id: &str) -> Result<bool, SessionError> {
        self.open_course("mark attendance")?;
        if !self.roster.iter().any(|s| s.id == student_id) {
            return Err(SessionError::NotFound {
                what: "student",
                id: student_id.to_string(),
            });
        }
        let marked = if self.pending.remove(student_id) {
            false
        } else {
            self.pending.insert(student_id.to_string());
            true
        };
        Ok(marked)
    }

    pub fn attendance_sheet(&self) -> Result<AttendanceSheet, SessionError> {
        let course = self.open_course("view attendance")?;
        let department_name = self
            .nav
            .selections()
            .department
            .map(|d| d.name.clone())
            .unwrap_or_default();
        let ledger = ledger::get(self.store.as_ref());
        let rows = self
            .roster
            .iter()
            .map(|student| {
                let weeks = ledger::weeks(&ledger, &course.id, &student.id);
                let percent = ledger::attendance_percent(weeks);
                AttendanceRow {
                    student: student.clone(),
                    weeks,
                    percent,
                    band: ledger::band(percent),
                    marked: self.pending.contains(&student.id),
                }
            })
            .collect();
        Ok(AttendanceSheet {
            course: course.clone(),
            department_name,
            max_weeks: MAX_WEEKS,
            marked_count: self.pending.len(),
            rows,
        })
    }

    /// Writes this week's marks: every rostered student moves up a week if
    /// marked and down a week otherwise. A storage failure part-way leaves
    /// the students already written updated.
    pub fn commit_attendance(&mut self) -> Result<CommitSummary, SessionError> {
        let course_id = self.open_course("commit attendance")?.id.clone();
        if !self.options.save_delay.is_zero() {
            std::thread::sleep(self.options.save_delay);
        }

        let mut weeks = BTreeMap::new();
        for student in &self.roster {
            let attended = self.pending.contains(&student.id);
            let n = ledger::record_attendance(self.store.as_mut(), &course_id, &student.id, attended)?;
            weeks.insert(student.id.clone(), n);
        }
        let present = self.pending.len();
        let absent = self.roster.len() - present;
        self.pending.clear();

        info!(course_id = %course_id, present, absent, "attendance committed");
        Ok(CommitSummary {
            course_id,
            committed_at: chrono::Utc::now().to_rfc3339(),
            present,
            absent,
            weeks,
        })
    }

    pub fn ledger(&self) -> Result<AttendanceLedger, SessionError> {
        self.require_auth()?;
        Ok(ledger::get(self.store.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Memory store that refuses writes once its budget runs out.
    struct DiskFullStore {
        inner: MemoryStore,
        saves_left: Arc<AtomicUsize>,
    }

    impl KvStore for DiskFullStore {
        fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.load(key)
        }

        fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            let left = self.saves_left.load(Ordering::SeqCst);
            if left == 0 {
                anyhow::bail!("disk full");
            }
            self.saves_left.store(left - 1, Ordering::SeqCst);
            self.inner.save(key, value)
        }
    }

    fn session_on(store: Box<dyn KvStore>) -> Session {
        Session::new(
            store,
            SessionOptions {
                save_delay: Duration::ZERO,
                roster_seed: Some(1),
            },
        )
    }

    fn session() -> Session {
        session_on(Box::new(MemoryStore::new()))
    }

    /// Session over a store whose remaining write budget the test controls.
    fn session_with_budget() -> (Session, Arc<AtomicUsize>) {
        let saves_left = Arc::new(AtomicUsize::new(usize::MAX));
        let store = DiskFullStore {
            inner: MemoryStore::new(),
            saves_left: Arc::clone(&saves_left),
        };
        (session_on(Box::new(store)), saves_left)
    }

    fn sign_in(s: &mut Session) {
        s.register("Prof. Adebisi Folu", "get102", "key").expect("register");
    }

    fn open_attendance(s: &mut Session) {
        s.select_college("eng").expect("college");
        s.select_department("mech-eng", None).expect("department");
        s.select_level(100).expect("level");
        s.select_course("mech-eng-100-GET102").expect("course");
    }

    fn signed_in() -> Session {
        let mut s = session();
        sign_in(&mut s);
        s
    }

    fn at_attendance() -> Session {
        let mut s = signed_in();
        open_attendance(&mut s);
        s
    }

    #[test]
    fn registration_signs_in_and_lands_on_colleges() {
        let s = signed_in();
        assert_eq!(s.screen(), Screen::Colleges);
        assert_eq!(s.user().map(|u| u.username.as_str()), Some("GET102"));
        assert!(s.session_id().is_some());
    }

    #[test]
    fn incomplete_registration_changes_nothing() {
        let mut s = session();
        s.toggle_auth_mode().expect("signup");
        let e = s.register("", "GET102", "key").expect_err("missing name");
        assert_eq!(e.code(), "validation_failed");
        assert_eq!(s.screen(), Screen::Signup);
        assert!(!s.is_authenticated());
    }

    #[test]
    fn login_after_logout_uses_stored_identity() {
        let mut s = signed_in();
        assert!(s.logout());
        assert_eq!(s.screen(), Screen::Login);
        assert_eq!(s.login("GET102", "wrong").expect_err("bad key").code(), "auth_failed");
        assert_eq!(s.screen(), Screen::Login);
        s.login(" get102 ", "key").expect("login");
        assert_eq!(s.screen(), Screen::Colleges);
    }

    #[test]
    fn login_without_registration_reports_missing_identity() {
        let mut s = session();
        assert_eq!(s.login("GET102", "key").expect_err("no record").code(), "no_identity");
    }

    #[test]
    fn registering_while_signed_in_replaces_the_identity() {
        let mut s = at_attendance();
        s.register("Dr. Second", "MTH202", "other").expect("register again");
        assert_eq!(s.screen(), Screen::Colleges);
        s.logout();
        assert_eq!(s.login("GET102", "key").expect_err("old identity").code(), "auth_failed");
        s.login("MTH202", "other").expect("new identity");
        assert_eq!(s.user().map(|u| u.full_name.as_str()), Some("Dr. Second"));
    }

    #[test]
    fn navigation_requires_sign_in() {
        let mut s = session();
        assert_eq!(s.select_college("eng").expect_err("anon").code(), "not_authenticated");
    }

    #[test]
    fn unknown_catalog_entries_are_not_found() {
        let mut s = signed_in();
        assert_eq!(s.select_college("law").expect_err("law").code(), "not_found");
        s.select_college("basic-sci").expect("college");
        assert_eq!(s.select_department("mech-eng", None).expect_err("wrong college").code(), "not_found");
        assert_eq!(
            s.select_department("math-sci", Some("Physics")).expect_err("bad sub").code(),
            "not_found"
        );
        s.select_department("math-sci", Some("Statistics")).expect("sub-department");
        assert_eq!(s.select_level(500).expect_err("no 500L").code(), "not_found");
        assert_eq!(s.levels().expect("levels"), vec![100, 200, 300, 400]);
    }

    #[test]
    fn selection_out_of_order_is_an_invalid_transition() {
        let mut s = signed_in();
        let e = s.select_level(100).expect_err("no department");
        assert_eq!(e.code(), "invalid_transition");
        assert_eq!(e.details().expect("details")["screen"], "colleges");
    }

    #[test]
    fn attendance_view_holds_one_roster() {
        let mut s = at_attendance();
        let first = s.attendance_sheet().expect("sheet");
        assert_eq!(first.rows.len(), 50);
        s.toggle_attendance("mech-eng-student-3").expect("toggle");
        let second = s.attendance_sheet().expect("sheet");
        let names = |sheet: &AttendanceSheet| {
            sheet.rows.iter().map(|r| r.student.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(second.marked_count, 1);
        assert!(second.rows[2].marked);
    }

    #[test]
    fn toggle_twice_unmarks() {
        let mut s = at_attendance();
        assert!(s.toggle_attendance("mech-eng-student-1").expect("mark"));
        assert!(!s.toggle_attendance("mech-eng-student-1").expect("unmark"));
        assert_eq!(s.toggle_attendance("econ-student-1").expect_err("stranger").code(), "not_found");
    }

    #[test]
    fn commit_moves_marked_up_and_others_down() {
        let mut s = at_attendance();
        s.toggle_attendance("mech-eng-student-1").expect("mark");
        s.toggle_attendance("mech-eng-student-2").expect("mark");
        let summary = s.commit_attendance().expect("commit");
        assert_eq!(summary.present, 2);
        assert_eq!(summary.absent, 48);
        assert_eq!(summary.weeks["mech-eng-student-1"], 1);
        assert_eq!(summary.weeks["mech-eng-student-3"], 0);

        // Pending set is cleared, so a second commit walks the marked students back.
        let again = s.commit_attendance().expect("commit again");
        assert_eq!(again.present, 0);
        assert_eq!(again.weeks["mech-eng-student-1"], 0);

        let sheet = s.attendance_sheet().expect("sheet");
        assert_eq!(sheet.marked_count, 0);
        let ledger = s.ledger().expect("ledger");
        assert_eq!(ledger["mech-eng-100-GET102"].len(), 50);
    }

    #[test]
    fn sheet_reports_percent_and_band() {
        let mut s = at_attendance();
        for _ in 0..10 {
            s.toggle_attendance("mech-eng-student-5").expect("mark");
            s.commit_attendance().expect("commit");
        }
        let sheet = s.attendance_sheet().expect("sheet");
        let row = &sheet.rows[4];
        assert_eq!(row.weeks, 10);
        assert_eq!(row.percent, 71);
        assert_eq!(row.band, AttendanceBand::Good);
    }

    #[test]
    fn leaving_attendance_drops_the_pending_marks() {
        let mut s = at_attendance();
        s.toggle_attendance("mech-eng-student-1").expect("mark");
        assert_eq!(s.go_back(), Screen::Courses);
        assert_eq!(s.toggle_attendance("mech-eng-student-1").expect_err("closed").code(), "invalid_transition");
        s.select_course("mech-eng-100-GET102").expect("reopen");
        assert_eq!(s.attendance_sheet().expect("sheet").marked_count, 0);
    }

    #[test]
    fn four_backs_reach_colleges() {
        let mut s = at_attendance();
        for _ in 0..4 {
            s.go_back();
        }
        assert_eq!(s.screen(), Screen::Colleges);
        assert_eq!(s.go_back(), Screen::Colleges);
    }

    #[test]
    fn expiry_is_a_logout() {
        let mut s = at_attendance();
        assert!(s.expire());
        assert_eq!(s.screen(), Screen::Login);
        assert!(s.user().is_none());
        assert!(!s.expire());
    }

    #[test]
    fn login_is_rejected_while_signed_in() {
        let mut s = signed_in();
        assert_eq!(s.login("GET102", "key").expect_err("already in").code(), "invalid_transition");
    }

    #[test]
    fn storage_failure_mid_commit_keeps_written_students_and_pending_marks() {
        let (mut s, saves_left) = session_with_budget();
        sign_in(&mut s);
        open_attendance(&mut s);
        s.toggle_attendance("mech-eng-student-1").expect("mark");
        s.toggle_attendance("mech-eng-student-2").expect("mark");

        saves_left.store(3, Ordering::SeqCst);
        let e = s.commit_attendance().expect_err("disk full");
        assert_eq!(e.code(), "storage_failed");

        let ledger = s.ledger().expect("ledger");
        let cells = &ledger["mech-eng-100-GET102"];
        assert_eq!(cells["mech-eng-student-1"], 1);
        assert_eq!(cells["mech-eng-student-2"], 1);
        assert_eq!(cells["mech-eng-student-3"], 0);
        assert_eq!(cells.len(), 3);
        assert!(!cells.contains_key("mech-eng-student-4"));

        let sheet = s.attendance_sheet().expect("sheet");
        assert_eq!(sheet.marked_count, 2);
        assert!(sheet.rows[0].marked);
        assert_eq!(s.screen(), Screen::Attendance);

        saves_left.store(usize::MAX, Ordering::SeqCst);
        let retried = s.commit_attendance().expect("retry");
        assert_eq!(retried.present, 2);
        assert_eq!(s.ledger().expect("ledger")["mech-eng-100-GET102"].len(), 50);
    }

    #[test]
    fn storage_failure_on_register_keeps_the_current_screen() {
        let (mut s, saves_left) = session_with_budget();
        s.toggle_auth_mode().expect("signup");
        saves_left.store(0, Ordering::SeqCst);
        let e = s.register("Dr. New", "PHY101", "pw").expect_err("disk full");
        assert_eq!(e.code(), "storage_failed");
        assert_eq!(s.screen(), Screen::Signup);
        assert!(!s.is_authenticated());

        saves_left.store(usize::MAX, Ordering::SeqCst);
        sign_in(&mut s);
        s.select_college("eng").expect("college");
        saves_left.store(0, Ordering::SeqCst);
        let e = s.register("Dr. New", "PHY101", "pw").expect_err("disk full");
        assert_eq!(e.code(), "storage_failed");
        assert_eq!(s.screen(), Screen::Departments);
        assert_eq!(s.user().map(|u| u.username.as_str()), Some("GET102"));
        s.logout();
        s.login("GET102", "key").expect("old identity kept");
    }
}

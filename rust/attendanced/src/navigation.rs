use crate::catalog::SelectedDepartment;
use crate::roster::Course;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Login,
    Signup,
    Colleges,
    Departments,
    Levels,
    Courses,
    Attendance,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Login => "login",
            Screen::Signup => "signup",
            Screen::Colleges => "colleges",
            Screen::Departments => "departments",
            Screen::Levels => "levels",
            Screen::Courses => "courses",
            Screen::Attendance => "attendance",
        };
        f.write_str(name)
    }
}

/// Where the lecturer is, carrying exactly the drill-down selections that
/// screen depends on. Deeper variants cannot exist without their ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NavState {
    #[default]
    Login,
    Signup,
    Colleges,
    Departments {
        college_id: String,
    },
    Levels {
        college_id: String,
        department: SelectedDepartment,
    },
    Courses {
        college_id: String,
        department: SelectedDepartment,
        level: u16,
    },
    Attendance {
        college_id: String,
        department: SelectedDepartment,
        level: u16,
        course: Course,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: Screen,
    pub action: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} from the {} screen", self.action, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selections<'a> {
    pub college_id: Option<&'a str>,
    pub department: Option<&'a SelectedDepartment>,
    pub level: Option<u16>,
    pub course: Option<&'a Course>,
}

impl NavState {
    pub fn screen(&self) -> Screen {
        match self {
            NavState::Login => Screen::Login,
            NavState::Signup => Screen::Signup,
            NavState::Colleges => Screen::Colleges,
            NavState::Departments { .. } => Screen::Departments,
            NavState::Levels { .. } => Screen::Levels,
            NavState::Courses { .. } => Screen::Courses,
            NavState::Attendance { .. } => Screen::Attendance,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, NavState::Login | NavState::Signup)
    }

    pub fn selections(&self) -> Selections<'_> {
        match self {
            NavState::Login | NavState::Signup | NavState::Colleges => Selections::default(),
            NavState::Departments { college_id } => Selections {
                college_id: Some(college_id.as_str()),
                ..Selections::default()
            },
            NavState::Levels {
                college_id,
                department,
            } => Selections {
                college_id: Some(college_id.as_str()),
                department: Some(department),
                ..Selections::default()
            },
            NavState::Courses {
                college_id,
                department,
                level,
            } => Selections {
                college_id: Some(college_id.as_str()),
                department: Some(department),
                level: Some(*level),
                course: None,
            },
            NavState::Attendance {
                college_id,
                department,
                level,
                course,
            } => Selections {
                college_id: Some(college_id.as_str()),
                department: Some(department),
                level: Some(*level),
                course: Some(course),
            },
        }
    }

    pub fn reject(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            from: self.screen(),
            action,
        }
    }

    pub fn toggle_auth_mode(&mut self) -> Result<(), InvalidTransition> {
        match self {
            NavState::Login => *self = NavState::Signup,
            NavState::Signup => *self = NavState::Login,
            _ => return Err(self.reject("switch between login and registration")),
        }
        Ok(())
    }

    /// Credential check or registration succeeded.
    pub fn authenticated(&mut self) {
        *self = NavState::Colleges;
    }

    pub fn select_college(&mut self, college_id: &str) -> Result<(), InvalidTransition> {
        if !matches!(self, NavState::Colleges) {
            return Err(self.reject("select a college"));
        }
        *self = NavState::Departments {
            college_id: college_id.to_string(),
        };
        Ok(())
    }

    pub fn select_department(
        &mut self,
        department: SelectedDepartment,
    ) -> Result<(), InvalidTransition> {
        match std::mem::take(self) {
            NavState::Departments { college_id } => {
                *self = NavState::Levels {
                    college_id,
                    department,
                };
                Ok(())
            }
            other => self.restore(other, "select a department"),
        }
    }

    pub fn select_level(&mut self, level: u16) -> Result<(), InvalidTransition> {
        match std::mem::take(self) {
            NavState::Levels {
                college_id,
                department,
            } => {
                *self = NavState::Courses {
                    college_id,
                    department,
                    level,
                };
                Ok(())
            }
            other => self.restore(other, "select a level"),
        }
    }

    pub fn select_course(&mut self, course: Course) -> Result<(), InvalidTransition> {
        match std::mem::take(self) {
            NavState::Courses {
                college_id,
                department,
                level,
            } => {
                *self = NavState::Attendance {
                    college_id,
                    department,
                    level,
                    course,
                };
                Ok(())
            }
            other => self.restore(other, "select a course"),
        }
    }

    fn restore(&mut self, previous: NavState, action: &'static str) -> Result<(), InvalidTransition> {
        *self = previous;
        Err(self.reject(action))
    }

    /// One step up the drill-down. Returns whether anything changed.
    pub fn go_back(&mut self) -> bool {
        let prev = match std::mem::take(self) {
            NavState::Attendance {
                college_id,
                department,
                level,
                ..
            } => NavState::Courses {
                college_id,
                department,
                level,
            },
            NavState::Courses {
                college_id,
                department,
                ..
            } => NavState::Levels {
                college_id,
                department,
            },
            NavState::Levels { college_id, .. } => NavState::Departments { college_id },
            NavState::Departments { .. } => NavState::Colleges,
            unchanged => {
                *self = unchanged;
                return false;
            }
        };
        *self = prev;
        true
    }

    pub fn logout(&mut self) {
        *self = NavState::Login;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_department;
    use crate::roster::generate_courses_for_level;

    fn mech() -> SelectedDepartment {
        SelectedDepartment::from(find_department("mech-eng").expect("department"))
    }

    fn at_attendance() -> NavState {
        let mut nav = NavState::Colleges;
        nav.select_college("eng").expect("college");
        nav.select_department(mech()).expect("department");
        nav.select_level(100).expect("level");
        let course = generate_courses_for_level(&mech(), 100).remove(0);
        nav.select_course(course).expect("course");
        nav
    }

    #[test]
    fn starts_at_login_and_toggles_to_signup() {
        let mut nav = NavState::default();
        assert_eq!(nav.screen(), Screen::Login);
        nav.toggle_auth_mode().expect("toggle");
        assert_eq!(nav.screen(), Screen::Signup);
        nav.toggle_auth_mode().expect("toggle back");
        assert_eq!(nav.screen(), Screen::Login);
        assert!(!nav.is_authenticated());
    }

    #[test]
    fn selecting_a_college_lands_on_departments() {
        let mut nav = NavState::Colleges;
        nav.select_college("eng").expect("college");
        assert_eq!(nav.screen(), Screen::Departments);
        assert_eq!(nav.selections().college_id, Some("eng"));
    }

    #[test]
    fn four_backs_from_attendance_reach_colleges_and_stop() {
        let mut nav = at_attendance();
        assert_eq!(nav.screen(), Screen::Attendance);
        let expected = [
            Screen::Courses,
            Screen::Levels,
            Screen::Departments,
            Screen::Colleges,
        ];
        for screen in expected {
            assert!(nav.go_back());
            assert_eq!(nav.screen(), screen);
        }
        assert!(!nav.go_back());
        assert_eq!(nav, NavState::Colleges);
    }

    #[test]
    fn going_back_drops_only_the_deepest_selection() {
        let mut nav = at_attendance();
        nav.go_back();
        let sel = nav.selections();
        assert_eq!(sel.level, Some(100));
        assert!(sel.course.is_none());
        assert_eq!(sel.department.map(|d| d.id.as_str()), Some("mech-eng"));
    }

    #[test]
    fn out_of_order_events_are_rejected_without_change() {
        let mut nav = NavState::Colleges;
        let e = nav.select_level(200).expect_err("no department yet");
        assert_eq!(e.from, Screen::Colleges);
        assert_eq!(nav, NavState::Colleges);

        let mut nav = at_attendance();
        let before = nav.clone();
        assert!(nav.select_college("env").is_err());
        assert!(nav.toggle_auth_mode().is_err());
        assert_eq!(nav, before);
    }

    #[test]
    fn login_screens_ignore_back() {
        let mut nav = NavState::Signup;
        assert!(!nav.go_back());
        assert_eq!(nav, NavState::Signup);
    }

    #[test]
    fn logout_clears_every_selection() {
        let mut nav = at_attendance();
        nav.logout();
        assert_eq!(nav, NavState::Login);
        assert_eq!(nav.selections(), Selections::default());
    }
}

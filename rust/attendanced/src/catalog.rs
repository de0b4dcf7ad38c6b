//! Fixed university catalog: colleges, their departments, and the literal
//! first-year engineering course table.

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: &'static str,
    pub name: &'static str,
    pub departments: &'static [Department],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: &'static str,
    pub name: &'static str,
    pub is_engineering: bool,
    #[serde(skip_serializing_if = "has_no_subs")]
    pub sub_departments: &'static [SubDepartment],
}

#[derive(Debug, Serialize)]
pub struct SubDepartment {
    pub name: &'static str,
    pub list: &'static [&'static str],
}

fn has_no_subs(subs: &&'static [SubDepartment]) -> bool {
    subs.is_empty()
}

#[derive(Debug, Clone, Copy)]
pub struct LiteralCourse {
    pub code: &'static str,
    pub name: &'static str,
}

const fn dept(id: &'static str, name: &'static str) -> Department {
    Department {
        id,
        name,
        is_engineering: false,
        sub_departments: &[],
    }
}

const fn eng(id: &'static str, name: &'static str) -> Department {
    Department {
        id,
        name,
        is_engineering: true,
        sub_departments: &[],
    }
}

const fn sub(name: &'static str, list: &'static [&'static str]) -> SubDepartment {
    SubDepartment { name, list }
}

pub static COLLEGES: &[College] = &[
    College {
        id: "eng",
        name: "College of Engineering",
        departments: &[
            eng("mech-eng", "Mechanical Engineering"),
            eng("mechtr-eng", "Mechatronics Engineering"),
            eng("chem-eng", "Chemical Engineering"),
            eng("elec-eng", "Elect/Electrical Engineering"),
            eng("civil-eng", "Civil Engineering"),
            eng("comp-eng", "Computer Engineering"),
            eng("agric-eng", "Agriculture Engineering"),
            eng("food-sci", "Food Science and Technology"),
        ],
    },
    College {
        id: "basic-sci",
        name: "College of Basic Science",
        departments: &[
            dept("comp-sci", "Computer Science"),
            Department {
                id: "math-sci",
                name: "Mathematics Science",
                is_engineering: false,
                sub_departments: &[
                    sub("Mathematics", &["Mathematics"]),
                    sub("Industrial Mathematics", &["Industrial Mathematics"]),
                    sub("Statistics", &["Statistics"]),
                ],
            },
            Department {
                id: "chem-sci",
                name: "Chemical Science",
                is_engineering: false,
                sub_departments: &[
                    sub("Chemistry", &["Chemistry"]),
                    sub("Industrial Chemistry", &["Industrial Chemistry"]),
                    sub("Biochemistry", &["Biochemistry"]),
                ],
            },
            Department {
                id: "bio-sci",
                name: "Biological Science",
                is_engineering: false,
                sub_departments: &[
                    sub("Zoology", &["Zoology"]),
                    sub("Botany", &["Botany"]),
                    sub("Microbiology", &["Microbiology"]),
                ],
            },
        ],
    },
    College {
        id: "applied-soc",
        name: "College of Applied Social-Science",
        departments: &[
            dept("econ", "Economics"),
            dept("acc", "Accounting"),
            dept("oim", "Office and Information Management (OIM)"),
            dept("ins", "Insurance"),
            dept("bank", "Banking and Finance"),
            dept("act-sci", "Actuarial Science"),
            dept("bus-admin", "Business Administration"),
            dept("mass-comm", "Mass Communication"),
        ],
    },
    College {
        id: "env",
        name: "College of Environmental",
        departments: &[
            dept("arch", "Architecture"),
            dept("quan-surv", "Quantity Survey"),
            dept("art-des", "Art and Design"),
            dept("urb-plan", "Urban and Regional Planning"),
            dept("est-mgt", "Estate Management"),
            dept("build-tech", "Building Tech"),
        ],
    },
    College {
        id: "agric",
        name: "College of Agriculture",
        departments: &[
            dept("ani-sci", "Department of Animal Science"),
            dept("agric-econ", "Department of Agricultural Economics and Extension"),
            dept("agron", "Department of Agronomy"),
            dept("fish-wild", "Department of Fisheries and Wildlife Management"),
        ],
    },
];

pub static ENGINEERING_100L_COURSES: &[LiteralCourse] = &[
    LiteralCourse { code: "GET102", name: "Engineering graphics and solid modelling" },
    LiteralCourse { code: "CHM102", name: "General chemistry II" },
    LiteralCourse { code: "CHM108", name: "General practical chemistry II" },
    LiteralCourse { code: "MTH102", name: "Elementary mathematics II" },
    LiteralCourse { code: "PHY102", name: "General practical II" },
    LiteralCourse { code: "PHY108", name: "General practical physics II" },
    LiteralCourse { code: "STA112", name: "Probability" },
    LiteralCourse { code: "PHY104", name: "General physics IV" },
    LiteralCourse { code: "YOR102", name: "Communication in Yoruba" },
];

pub fn college(id: &str) -> Option<&'static College> {
    COLLEGES.iter().find(|c| c.id == id)
}

impl College {
    pub fn department(&self, id: &str) -> Option<&'static Department> {
        self.departments.iter().find(|d| d.id == id)
    }
}

impl Department {
    pub fn sub_department(&self, name: &str) -> Option<&'static SubDepartment> {
        self.sub_departments.iter().find(|s| s.name == name)
    }
}

/// A department as chosen on the departments screen. Choosing a
/// sub-department keeps the parent id but takes the sub-department's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedDepartment {
    pub id: String,
    pub name: String,
    pub is_engineering: bool,
}

impl From<&Department> for SelectedDepartment {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.to_string(),
            is_engineering: d.is_engineering,
        }
    }
}

impl Department {
    /// `None` picks the department itself; an unknown sub-department name
    /// yields `None`.
    pub fn select(&self, sub_department: Option<&str>) -> Option<SelectedDepartment> {
        let mut selected = SelectedDepartment::from(self);
        if let Some(name) = sub_department {
            selected.name = self.sub_department(name)?.name.to_string();
        }
        Some(selected)
    }
}

/// Department lookup across every college.
#[cfg(test)]
pub fn find_department(id: &str) -> Option<&'static Department> {
    COLLEGES.iter().find_map(|c| c.department(id))
}

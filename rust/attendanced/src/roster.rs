use crate::catalog::{SelectedDepartment, ENGINEERING_100L_COURSES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const ROSTER_SIZE: usize = 50;
pub const BASE_LEVELS: [u16; 4] = [100, 200, 300, 400];
pub const ENGINEERING_EXTRA_LEVEL: u16 = 500;
const MATRIC_YEAR: u16 = 2023;

const FIRST_NAMES: [&str; 25] = [
    "Abiola", "Bayo", "Chidi", "Daramola", "Efe", "Fadekemi", "Gbenga", "Hassan", "Ibrahim",
    "Jumoke", "Kayode", "Lekan", "Musa", "Nneka", "Olawale", "Patience", "Quasim", "Rofiat",
    "Segun", "Taiwo", "Uche", "Victoria", "Wale", "Yemi", "Zainab",
];
const LAST_NAMES: [&str; 25] = [
    "Adebayo", "Bello", "Chukwu", "Dada", "Eze", "Fashola", "Gbadamosi", "Hamzat", "Idris",
    "Johnson", "Kehinde", "Lawal", "Mohammed", "Nwachukwu", "Okoro", "Popoola", "Raji", "Salami",
    "Tijani", "Usman", "Williams", "Yusuf", "Balogun", "Ojo", "Sanni",
];

const COURSE_SUFFIXES: [&str; 8] = [
    "Introduction to Professionalism",
    "Advanced Theory & Practice",
    "Research Methodology",
    "Quantitative Techniques",
    "Applied Concepts II",
    "Ethics and Communication",
    "Special Projects II",
    "Global Perspectives",
];
const FALLBACK_SUFFIX: &str = "Special Seminar";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub matric_no: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub level: u16,
    pub department_id: String,
}

fn dept_prefix(department_id: &str) -> String {
    department_id.chars().take(3).collect::<String>().to_uppercase()
}

pub fn offered_levels(department: &SelectedDepartment) -> Vec<u16> {
    let mut levels = BASE_LEVELS.to_vec();
    if department.is_engineering {
        levels.push(ENGINEERING_EXTRA_LEVEL);
    }
    levels
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a of the department id mixed with the seed. Fixed arithmetic, so
/// the value does not move between toolchains.
fn department_seed(department_id: &str, seed: u64) -> u64 {
    let hash = department_id
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    hash ^ seed
}

/// Deterministic RNG for a department. The same `(department_id, seed)` pair
/// always yields the same roster.
pub fn seeded_rng(department_id: &str, seed: u64) -> StdRng {
    StdRng::seed_from_u64(department_seed(department_id, seed))
}

/// Fresh roster with ambient randomness. Names differ between calls; hold
/// the result for as long as the attendance view is open.
pub fn generate_students(department_id: &str) -> Vec<Student> {
    generate_students_with(department_id, &mut rand::rng())
}

pub fn generate_students_with<R: Rng>(department_id: &str, rng: &mut R) -> Vec<Student> {
    let prefix = dept_prefix(department_id);
    (1..=ROSTER_SIZE)
        .map(|i| {
            let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
            Student {
                id: format!("{department_id}-student-{i}"),
                name: format!("{first} {last}"),
                matric_no: format!("LASU/{prefix}/{MATRIC_YEAR}/{i:03}"),
                department: department_id.to_string(),
            }
        })
        .collect()
}

pub fn generate_courses_for_level(department: &SelectedDepartment, level: u16) -> Vec<Course> {
    let make = |code: String, name: String| Course {
        id: format!("{}-{}-{}", department.id, level, code),
        code,
        name,
        level,
        department_id: department.id.clone(),
    };

    if department.is_engineering && level == 100 {
        return ENGINEERING_100L_COURSES
            .iter()
            .map(|c| make(c.code.to_string(), c.name.to_string()))
            .collect();
    }

    let prefix = dept_prefix(&department.id);
    let templates = [
        format!("{prefix}{}", level + 2),
        format!("{prefix}{}", level + 4),
        format!("{prefix}{}", level + 6),
        format!("GST{}", level + 2),
        format!("MTH{}", level + 2),
        format!("STA{}", level + 2),
    ];
    let count: u16 = if level == 100 { 8 } else { 6 };

    (0..count)
        .map(|i| {
            let idx = usize::from(i);
            let code = templates
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("{prefix}{}", level + 10 + i));
            let suffix = COURSE_SUFFIXES.get(idx).copied().unwrap_or(FALLBACK_SUFFIX);
            make(code, format!("{} {}", department.name, suffix))
        })
        .collect()
}

//! File-Backed User Store
//!
//! Student and teacher accounts are kept in a single pretty-printed JSON
//! file. The whole file is rewritten after every change. A missing file is
//! seeded with the default accounts on first start.

use crate::models::{Profile, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("User '{0}' not found")]
    UnknownUser(String),
    #[error("Username '{0}' already exists")]
    UsernameTaken(String),
    #[error("An account with email '{0}' already exists")]
    EmailTaken(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Already enrolled in '{0}'")]
    AlreadyEnrolled(String),
    #[error("Not enrolled in '{0}'")]
    NotEnrolled(String),
    #[error("User file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("User file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Student {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Teacher {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub courses: Vec<String>,
}

/// The on-disk layout of the user file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserDirectory {
    #[serde(default)]
    pub students: BTreeMap<String, Student>,
    #[serde(default)]
    pub teachers: BTreeMap<String, Teacher>,
}

fn student(name: &str, email: &str, password: &str, courses: &[&str]) -> Student {
    Student {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        enrolled_courses: courses.iter().map(|c| c.to_string()).collect(),
    }
}

fn teacher(name: &str, email: &str, password: &str, courses: &[&str]) -> Teacher {
    Teacher {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        courses: courses.iter().map(|c| c.to_string()).collect(),
    }
}

impl UserDirectory {
    /// The accounts written when no user file exists yet.
    pub fn seed() -> Self {
        let mut directory = Self::default();
        directory.students.insert(
            "rhm".into(),
            student("Abderrahim", "Abderrahim@student.com", "rhm123", &["Math"]),
        );
        directory.students.insert(
            "srn".into(),
            student("Sirine", "Sirine@student.com", "srn123", &["Physics"]),
        );
        directory
            .students
            .insert("adm".into(), student("Adam", "Adam@student.com", "adm123", &[]));
        directory.teachers.insert(
            "rcm".into(),
            teacher("Racim", "Racim@teacher.com", "rcm123", &["Math"]),
        );
        directory.teachers.insert(
            "amn".into(),
            teacher("Amani", "Amani@teacher.com", "amnB123", &["Physics"]),
        );
        directory.teachers.insert(
            "Teacher".into(),
            teacher("Teacher", "Teacher_C@teacher.com", "teacher123", &["Science"]),
        );
        directory
    }

    fn profile(&self, role: UserRole, username: &str) -> Option<Profile> {
        let (name, email, courses) = match role {
            UserRole::Student => self
                .students
                .get(username)
                .map(|s| (&s.name, &s.email, &s.enrolled_courses))?,
            UserRole::Teacher => self
                .teachers
                .get(username)
                .map(|t| (&t.name, &t.email, &t.courses))?,
        };
        Some(Profile {
            username: username.to_string(),
            name: name.clone(),
            email: email.clone(),
            role,
            courses: courses.clone(),
        })
    }

    /// Whether `email` belongs to any account other than (`role`, `username`).
    fn email_in_use(&self, email: &str, except: Option<(UserRole, &str)>) -> bool {
        let is_excluded = |role: UserRole, name: &str| except == Some((role, name));
        self.students
            .iter()
            .any(|(n, s)| s.email == email && !is_excluded(UserRole::Student, n.as_str()))
            || self
                .teachers
                .iter()
                .any(|(n, t)| t.email == email && !is_excluded(UserRole::Teacher, n.as_str()))
    }
}

/// New account details.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct UserStore {
    path: PathBuf,
    users: RwLock<UserDirectory>,
}

fn require_filled(fields: &[(&str, &str)]) -> Result<(), UserStoreError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(UserStoreError::InvalidInput(format!(
            "Field '{}' must not be empty",
            field
        ))),
        None => Ok(()),
    }
}

impl UserStore {
    /// Opens the user file at `path`, seeding it with the default accounts
    /// if it does not exist.
    pub fn open(path: &Path) -> Result<Self, UserStoreError> {
        let users = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            let seeded = UserDirectory::seed();
            std::fs::write(path, serde_json::to_string_pretty(&seeded)?)?;
            info!(path = %path.display(), "Seeded user file with default accounts");
            seeded
        };
        Ok(Self {
            path: path.to_path_buf(),
            users: RwLock::new(users),
        })
    }

    async fn persist(&self, users: &UserDirectory) -> Result<(), UserStoreError> {
        let json = serde_json::to_string_pretty(users)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Applies `change` to a copy of the directory and publishes the copy
    /// only once it has been written to disk. On any error the in-memory
    /// directory is left as it was.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut UserDirectory) -> Result<T, UserStoreError>,
    ) -> Result<T, UserStoreError> {
        let mut users = self.users.write().await;
        let mut next = users.clone();
        let outcome = change(&mut next)?;
        self.persist(&next).await?;
        *users = next;
        Ok(outcome)
    }

    /// Returns true iff `username` exists under `role` with `password`.
    pub async fn check_credentials(&self, username: &str, password: &str, role: UserRole) -> bool {
        let users = self.users.read().await;
        let matches = match role {
            UserRole::Student => users.students.get(username).map(|s| s.password == password),
            UserRole::Teacher => users.teachers.get(username).map(|t| t.password == password),
        };
        matches.unwrap_or(false)
    }

    pub async fn profile(&self, role: UserRole, username: &str) -> Result<Profile, UserStoreError> {
        self.users
            .read()
            .await
            .profile(role, username)
            .ok_or_else(|| UserStoreError::UnknownUser(username.to_string()))
    }

    /// Creates an account. Usernames and emails are unique across both roles.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn register(&self, role: UserRole, account: NewAccount) -> Result<Profile, UserStoreError> {
        require_filled(&[
            ("username", account.username.as_str()),
            ("name", account.name.as_str()),
            ("email", account.email.as_str()),
            ("password", account.password.as_str()),
        ])?;

        let profile = self
            .commit(|users| {
                if users.students.contains_key(&account.username)
                    || users.teachers.contains_key(&account.username)
                {
                    return Err(UserStoreError::UsernameTaken(account.username));
                }
                if users.email_in_use(&account.email, None) {
                    return Err(UserStoreError::EmailTaken(account.email));
                }

                let username = account.username;
                match role {
                    UserRole::Student => {
                        users.students.insert(
                            username.clone(),
                            Student {
                                name: account.name,
                                email: account.email,
                                password: account.password,
                                enrolled_courses: Vec::new(),
                            },
                        );
                    }
                    UserRole::Teacher => {
                        users.teachers.insert(
                            username.clone(),
                            Teacher {
                                name: account.name,
                                email: account.email,
                                password: account.password,
                                courses: Vec::new(),
                            },
                        );
                    }
                }
                users
                    .profile(role, &username)
                    .ok_or(UserStoreError::UnknownUser(username))
            })
            .await?;
        info!(%role, "Account registered");
        Ok(profile)
    }

    /// Replaces the name, email and password of an existing account.
    pub async fn update_profile(
        &self,
        role: UserRole,
        username: &str,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Profile, UserStoreError> {
        require_filled(&[("name", name), ("email", email), ("password", password)])?;

        self.commit(|users| {
            if users.email_in_use(email, Some((role, username))) {
                return Err(UserStoreError::EmailTaken(email.to_string()));
            }

            let unknown = || UserStoreError::UnknownUser(username.to_string());
            let (n, e, p) = match role {
                UserRole::Student => {
                    let s = users.students.get_mut(username).ok_or_else(unknown)?;
                    (&mut s.name, &mut s.email, &mut s.password)
                }
                UserRole::Teacher => {
                    let t = users.teachers.get_mut(username).ok_or_else(unknown)?;
                    (&mut t.name, &mut t.email, &mut t.password)
                }
            };
            *n = name.to_string();
            *e = email.to_string();
            *p = password.to_string();
            users.profile(role, username).ok_or_else(unknown)
        })
        .await
    }

    /// Adds `course` to a student's enrollments. The caller validates that
    /// the course exists.
    pub async fn enroll(&self, username: &str, course: &str) -> Result<Profile, UserStoreError> {
        let profile = self
            .commit(|users| {
                let unknown = || UserStoreError::UnknownUser(username.to_string());
                let student = users.students.get_mut(username).ok_or_else(unknown)?;
                if student.enrolled_courses.iter().any(|c| c == course) {
                    return Err(UserStoreError::AlreadyEnrolled(course.to_string()));
                }
                student.enrolled_courses.push(course.to_string());
                users.profile(UserRole::Student, username).ok_or_else(unknown)
            })
            .await?;
        info!(%username, %course, "Student enrolled");
        Ok(profile)
    }

    pub async fn unenroll(&self, username: &str, course: &str) -> Result<Profile, UserStoreError> {
        let profile = self
            .commit(|users| {
                let unknown = || UserStoreError::UnknownUser(username.to_string());
                let student = users.students.get_mut(username).ok_or_else(unknown)?;
                let before = student.enrolled_courses.len();
                student.enrolled_courses.retain(|c| c != course);
                if student.enrolled_courses.len() == before {
                    return Err(UserStoreError::NotEnrolled(course.to_string()));
                }
                users.profile(UserRole::Student, username).ok_or_else(unknown)
            })
            .await?;
        info!(%username, %course, "Student unenrolled");
        Ok(profile)
    }

    /// Whether `course` is among the user's enrolled (student) or taught
    /// (teacher) courses.
    pub async fn has_course(&self, role: UserRole, username: &str, course: &str) -> bool {
        self.users
            .read()
            .await
            .profile(role, username)
            .is_some_and(|p| p.courses.iter().any(|c| c == course))
    }
}

//! Course Catalog and Materials
//!
//! The catalog holds the three fixed BAC courses and their descriptions.
//! Each course maps to a directory under the courses root whose PDFs can be
//! listed, downloaded, uploaded and deleted.

use crate::models::{CourseSummary, MaterialFolder};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Course '{0}' not found")]
    UnknownCourse(String),
    #[error("Invalid file path '{0}'")]
    InvalidPath(String),
    #[error("File '{0}' not found")]
    NotFound(String),
    #[error("Course file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct CourseEntry {
    description: String,
    teacher: String,
    dir: &'static str,
}

pub struct CourseCatalog {
    root: PathBuf,
    courses: RwLock<BTreeMap<String, CourseEntry>>,
}

fn is_pdf(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// Accepts only plain relative paths made of normal components.
fn checked_relative(path: &str) -> Result<PathBuf, CourseError> {
    let candidate = Path::new(path);
    let valid = !path.is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(candidate.to_path_buf())
    } else {
        Err(CourseError::InvalidPath(path.to_string()))
    }
}

fn sorted_entries(dir: &Path) -> std::io::Result<(Vec<String>, Vec<String>)> {
    let mut pdfs = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            dirs.push(name);
        } else if file_type.is_file() && is_pdf(&name) {
            pdfs.push(name);
        }
    }
    pdfs.sort();
    dirs.sort();
    Ok((pdfs, dirs))
}

/// Walks `dir` top-down, collecting every folder that holds PDFs or sub-folders.
fn walk(root: &Path, dir: &Path, out: &mut Vec<MaterialFolder>) -> std::io::Result<()> {
    let (pdfs, dirs) = sorted_entries(dir)?;
    let folder = dir
        .strip_prefix(root)
        .unwrap_or(dir)
        .to_string_lossy()
        .replace('\\', "/");

    let children: Vec<PathBuf> = dirs.iter().map(|d| dir.join(d)).collect();
    if !pdfs.is_empty() || !dirs.is_empty() {
        out.push(MaterialFolder { folder, pdfs, dirs });
    }
    for child in children {
        walk(root, &child, out)?;
    }
    Ok(())
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

impl CourseCatalog {
    /// Creates the catalog of the fixed BAC courses rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        let mut courses = BTreeMap::new();
        courses.insert(
            "Math".to_string(),
            CourseEntry {
                description: "📈 This course focuses on mathematics topics tailored for BAC students in Algeria.".to_string(),
                teacher: "Teacher A".to_string(),
                dir: "MATHS",
            },
        );
        courses.insert(
            "Physics".to_string(),
            CourseEntry {
                description: "⚙️ This course covers core physics concepts and problem-solving strategies for high school exams.".to_string(),
                teacher: "Teacher B".to_string(),
                dir: "PHYSICS",
            },
        );
        courses.insert(
            "Science".to_string(),
            CourseEntry {
                description: "🔬 This course provides scientific theory and practical knowledge for final-year students.".to_string(),
                teacher: "Teacher C".to_string(),
                dir: "SCIENCES",
            },
        );
        Self {
            root,
            courses: RwLock::new(courses),
        }
    }

    pub async fn list(&self) -> Vec<CourseSummary> {
        self.courses
            .read()
            .await
            .iter()
            .map(|(name, entry)| CourseSummary {
                name: name.clone(),
                description: entry.description.clone(),
                teacher: entry.teacher.clone(),
            })
            .collect()
    }

    pub async fn contains(&self, course: &str) -> bool {
        self.courses.read().await.contains_key(course)
    }

    /// Replaces a course description for the lifetime of the process.
    pub async fn update_description(
        &self,
        course: &str,
        description: &str,
    ) -> Result<CourseSummary, CourseError> {
        let mut courses = self.courses.write().await;
        let entry = courses
            .get_mut(course)
            .ok_or_else(|| CourseError::UnknownCourse(course.to_string()))?;
        entry.description = description.to_string();
        info!(%course, "Course description updated");
        Ok(CourseSummary {
            name: course.to_string(),
            description: entry.description.clone(),
            teacher: entry.teacher.clone(),
        })
    }

    async fn course_dir(&self, course: &str) -> Result<PathBuf, CourseError> {
        let courses = self.courses.read().await;
        let entry = courses
            .get(course)
            .ok_or_else(|| CourseError::UnknownCourse(course.to_string()))?;
        Ok(self.root.join(entry.dir))
    }

    /// Lists the folders of a course directory. A course whose directory
    /// does not exist yet has no materials.
    pub async fn list_materials(&self, course: &str) -> Result<Vec<MaterialFolder>, CourseError> {
        let dir = self.course_dir(course).await?;
        if !is_dir(&dir).await {
            warn!(%course, dir = %dir.display(), "Course directory is missing");
            return Ok(Vec::new());
        }
        let folders = tokio::task::spawn_blocking(move || {
            let mut folders = Vec::new();
            walk(&dir, &dir, &mut folders).map(|()| folders)
        })
        .await
        .map_err(std::io::Error::other)??;
        Ok(folders)
    }

    async fn pdf_path(&self, course: &str, path: &str) -> Result<PathBuf, CourseError> {
        let relative = checked_relative(path)?;
        if !is_pdf(path) {
            return Err(CourseError::InvalidPath(path.to_string()));
        }
        Ok(self.course_dir(course).await?.join(relative))
    }

    pub async fn read_pdf(&self, course: &str, path: &str) -> Result<Vec<u8>, CourseError> {
        let file = self.pdf_path(course, path).await?;
        if !is_file(&file).await {
            return Err(CourseError::NotFound(path.to_string()));
        }
        Ok(tokio::fs::read(&file).await?)
    }

    /// Writes a PDF into an existing folder of the course directory.
    pub async fn write_pdf(&self, course: &str, path: &str, bytes: &[u8]) -> Result<(), CourseError> {
        let file = self.pdf_path(course, path).await?;
        let parent_exists = match file.parent() {
            Some(parent) => is_dir(parent).await,
            None => false,
        };
        if !parent_exists {
            return Err(CourseError::NotFound(path.to_string()));
        }
        tokio::fs::write(&file, bytes).await?;
        info!(%course, %path, size = bytes.len(), "PDF uploaded");
        Ok(())
    }

    pub async fn delete_pdf(&self, course: &str, path: &str) -> Result<(), CourseError> {
        let file = self.pdf_path(course, path).await?;
        if !is_file(&file).await {
            return Err(CourseError::NotFound(path.to_string()));
        }
        tokio::fs::remove_file(&file).await?;
        info!(%course, %path, "PDF deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog_with_files() -> (TempDir, CourseCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let maths = dir.path().join("MATHS");
        fs::create_dir_all(maths.join("Algebra").join("Exams")).unwrap();
        fs::create_dir_all(maths.join("Empty")).unwrap();
        fs::write(maths.join("syllabus.pdf"), b"%PDF-1.4").unwrap();
        fs::write(maths.join("notes.txt"), b"skip").unwrap();
        fs::write(maths.join("Algebra").join("b.pdf"), b"%PDF-1.4 b").unwrap();
        fs::write(maths.join("Algebra").join("a.pdf"), b"%PDF-1.4 a").unwrap();
        let catalog = CourseCatalog::new(dir.path().to_path_buf());
        (dir, catalog)
    }

    #[tokio::test]
    async fn test_list_courses() {
        let catalog = CourseCatalog::new(PathBuf::from("."));
        let courses = catalog.list().await;
        let names: Vec<_> = courses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Math", "Physics", "Science"]);
        assert_eq!(courses[1].teacher, "Teacher B");
        assert!(catalog.contains("Science").await);
        assert!(!catalog.contains("History").await);
    }

    #[tokio::test]
    async fn test_update_description() {
        let catalog = CourseCatalog::new(PathBuf::from("."));
        let updated = catalog.update_description("Physics", "Mechanics and waves").await.unwrap();
        assert_eq!(updated.description, "Mechanics and waves");
        assert_eq!(catalog.list().await[1].description, "Mechanics and waves");
        assert!(matches!(
            catalog.update_description("History", "x").await,
            Err(CourseError::UnknownCourse(_))
        ));
    }

    #[tokio::test]
    async fn test_list_materials_walks_top_down() {
        let (_dir, catalog) = catalog_with_files();
        let folders = catalog.list_materials("Math").await.unwrap();

        assert_eq!(
            folders,
            vec![
                MaterialFolder {
                    folder: "".into(),
                    pdfs: vec!["syllabus.pdf".into()],
                    dirs: vec!["Algebra".into(), "Empty".into()],
                },
                MaterialFolder {
                    folder: "Algebra".into(),
                    pdfs: vec!["a.pdf".into(), "b.pdf".into()],
                    dirs: vec!["Exams".into()],
                },
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_material_listings_agree() {
        let (_dir, catalog) = catalog_with_files();
        let catalog = std::sync::Arc::new(catalog);
        let expected = catalog.list_materials("Math").await.unwrap();

        let listings: Vec<_> = (0..8)
            .map(|_| {
                let catalog = catalog.clone();
                tokio::spawn(async move { catalog.list_materials("Math").await })
            })
            .collect();
        for listing in listings {
            assert_eq!(listing.await.unwrap().unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_missing_course_directory_has_no_materials() {
        let (_dir, catalog) = catalog_with_files();
        assert!(catalog.list_materials("Physics").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_read_delete() {
        let (dir, catalog) = catalog_with_files();

        catalog
            .write_pdf("Math", "Algebra/Exams/bac2024.pdf", b"%PDF-1.7 exam")
            .await
            .unwrap();
        assert!(dir.path().join("MATHS/Algebra/Exams/bac2024.pdf").is_file());

        let bytes = catalog.read_pdf("Math", "Algebra/Exams/bac2024.pdf").await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7 exam");

        catalog.delete_pdf("Math", "Algebra/Exams/bac2024.pdf").await.unwrap();
        assert!(matches!(
            catalog.read_pdf("Math", "Algebra/Exams/bac2024.pdf").await,
            Err(CourseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_requires_existing_folder() {
        let (_dir, catalog) = catalog_with_files();
        assert!(matches!(
            catalog.write_pdf("Math", "Geometry/intro.pdf", b"%PDF").await,
            Err(CourseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_unsafe_or_non_pdf_paths() {
        let (_dir, catalog) = catalog_with_files();
        for path in ["../users.json", "/etc/passwd.pdf", "Algebra/../../x.pdf", "notes.txt", ""] {
            assert!(
                matches!(
                    catalog.read_pdf("Math", path).await,
                    Err(CourseError::InvalidPath(_))
                ),
                "path {path:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let (_dir, catalog) = catalog_with_files();
        assert!(matches!(
            catalog.list_materials("History").await,
            Err(CourseError::UnknownCourse(_))
        ));
    }
}

use tracing::debug;

use crate::models::Doctor;

/// The physician roster backing the appointment form. Passed around as an
/// injected lookup table; nothing reads it through module globals.
pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }

    /// The default roster shipped with the product.
    pub fn seeded() -> Self {
        let doctors = vec![
            Doctor::new("John Green", "/assets/images/dr-green.png"),
            Doctor::new("Leila Cameron", "/assets/images/dr-cameron.png"),
            Doctor::new("David Livingston", "/assets/images/dr-livingston.png"),
            Doctor::new("Evan Peter", "/assets/images/dr-peter.png"),
            Doctor::new("Jane Powell", "/assets/images/dr-powell.png"),
            Doctor::new("Alex Ramirez", "/assets/images/dr-remirez.png"),
            Doctor::new("Jasmine Lee", "/assets/images/dr-lee.png"),
            Doctor::new("Alyana Cruz", "/assets/images/dr-cruz.png"),
            Doctor::new("Hardik Sharma", "/assets/images/dr-sharma.png"),
        ];

        debug!("Seeded doctor directory with {} physicians", doctors.len());
        Self::new(doctors)
    }

    pub fn list(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Doctor> {
        let wanted = name.trim();
        self.doctors.iter().find(|d| d.name == wanted)
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }
}

impl Default for DoctorDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_directory_is_not_empty() {
        let directory = DoctorDirectory::seeded();
        assert!(!directory.is_empty());
    }

    #[test]
    fn lookup_by_exact_name() {
        let directory = DoctorDirectory::seeded();
        assert!(directory.contains("John Green"));
        assert!(directory.contains("  John Green  "));
        assert!(!directory.contains("Gregory House"));
    }
}

//! Course Library
//!
//! Named practice progressions, plus the resolver that turns either a course
//! name or a custom comma-separated chord list into a [`Chart`].
//!
//! # Example
//!
//! ```
//! use ukeflow::courses::CourseLibrary;
//!
//! let library = CourseLibrary::standard();
//!
//! // A named course
//! let basic = library.resolve("basic").unwrap();
//! assert_eq!(basic.steps()[0].chord, "C");
//!
//! // Anything else is parsed as a custom progression
//! let custom = library.resolve("G:4, C, D7").unwrap();
//! assert_eq!(custom.len(), 3);
//! ```

use crate::chart::{Chart, ScoreStep};
use crate::error::ConfigError;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::Serialize;

/// Course metadata
#[derive(Debug, Clone, Serialize)]
pub struct CourseInfo {
    /// Lookup name
    pub name: String,
    /// Description
    pub description: String,
    /// Difficulty level (1-5)
    pub difficulty: u8,
}

/// A named chord progression
#[derive(Debug, Clone)]
pub struct Course {
    pub info: CourseInfo,
    pub chart: Chart,
}

impl Course {
    pub fn new(name: impl Into<String>, difficulty: u8, steps: &[(&str, f64)]) -> Self {
        Self {
            info: CourseInfo {
                name: name.into(),
                description: String::new(),
                difficulty: difficulty.clamp(1, 5),
            },
            chart: Chart::new(
                steps
                    .iter()
                    .map(|&(chord, beats)| ScoreStep::new(chord, beats))
                    .collect(),
            ),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.info.description = desc.into();
        self
    }
}

/// Collection of courses
#[derive(Debug, Clone, Default)]
pub struct CourseLibrary {
    courses: Vec<Course>,
}

impl CourseLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in courses
    pub fn standard() -> Self {
        let mut library = Self::new();

        library.add(
            Course::new("basic", 1, &[("C", 4.0), ("Am", 4.0), ("F", 4.0), ("G", 4.0)])
                .with_description("The four-chord doo-wop loop, one bar each"),
        );
        library.add(
            Course::new("pop", 2, &[("C", 2.0), ("G", 2.0), ("Am", 2.0), ("F", 2.0)])
                .with_description("I-V-vi-IV at two beats per change"),
        );
        library.add(
            Course::new("folk", 2, &[("G", 4.0), ("C", 2.0), ("D7", 2.0), ("G", 4.0)])
                .with_description("Campfire changes in G"),
        );
        library.add(
            Course::new(
                "blues",
                3,
                &[
                    ("A7", 4.0),
                    ("D7", 4.0),
                    ("A7", 4.0),
                    ("A7", 4.0),
                    ("D7", 4.0),
                    ("D7", 4.0),
                    ("A7", 4.0),
                    ("A7", 4.0),
                    ("E7", 4.0),
                    ("D7", 4.0),
                    ("A7", 4.0),
                    ("E7", 4.0),
                ],
            )
            .with_description("Twelve-bar blues in A"),
        );
        library.add(
            Course::new(
                "jazz",
                4,
                &[("Dm", 2.0), ("G7", 2.0), ("C", 2.0), ("Am7", 2.0), ("Fmaj7", 2.0), ("E7", 2.0)],
            )
            .with_description("ii-V-I turnarounds"),
        );
        library.add(
            Course::new(
                "sprint",
                5,
                &[("C", 1.0), ("G", 1.0), ("Am", 1.0), ("F", 1.0), ("Bb", 1.0), ("C7", 1.0)],
            )
            .with_description("A chord change on every beat"),
        );

        library
    }

    /// Add a course, replacing any course with the same name
    pub fn add(&mut self, course: Course) {
        self.courses.retain(|c| c.info.name != course.info.name);
        self.courses.push(course);
    }

    /// Get a course by name
    pub fn get(&self, name: &str) -> Result<&Course, ConfigError> {
        self.courses
            .iter()
            .find(|c| c.info.name == name)
            .ok_or_else(|| ConfigError::UnknownCourse(name.to_string()))
    }

    /// List all courses
    pub fn list(&self) -> impl Iterator<Item = &CourseInfo> {
        self.courses.iter().map(|c| &c.info)
    }

    /// Courses at or below a difficulty level
    pub fn by_difficulty(&self, max: u8) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|c| c.info.difficulty <= max)
            .collect()
    }

    /// Resolve a course name or a custom progression into a chart.
    pub fn resolve(&self, course_or_custom: &str) -> Result<Chart, ConfigError> {
        let key = course_or_custom.trim();
        if let Ok(course) = self.get(key) {
            return Ok(course.chart.clone());
        }
        Ok(Chart::parse(key)?)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

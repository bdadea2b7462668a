use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use repokit::{ApplyPatch, Patch};

use crate::contract::model::{Course, CourseLevel, Instructor};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub bio: Patch<String>,
}

impl ApplyPatch<Instructor> for InstructorPatch {
    fn apply(self, instructor: &mut Instructor) {
        if let Some(name) = self.name {
            instructor.name = name;
        }
        self.bio.apply_to(&mut instructor.bio);
    }
}

/// Course fields a caller may change. The owning instructor is fixed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<CourseLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub published_at: Patch<DateTime<Utc>>,
}

impl ApplyPatch<Course> for CoursePatch {
    fn apply(self, course: &mut Course) {
        if let Some(level) = self.level {
            course.level = level;
        }
        if let Some(price) = self.price_cents {
            course.price_cents = price;
        }
        if let Some(tags) = self.tags {
            course.tags = tags;
        }
        self.published_at.apply_to(&mut course.published_at);
    }
}

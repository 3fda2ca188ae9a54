use super::tokenizer::{tokenize_query, tokenize_text};
use super::types::{CourseHit, CourseRecord};
use crate::index::SubjectFilter;

use std::collections::{HashMap, HashSet};

/// Inverted index over the courses of one term.
#[derive(Debug)]
pub struct CatalogIndex {
    courses: Vec<CourseRecord>,
    /// token -> positions in `courses`
    postings: HashMap<String, Vec<usize>>,
}

impl CatalogIndex {
    /// Indexes `courses`, keeping only those whose subject is in `allowed_subjects` when set.
    pub fn build(courses: Vec<CourseRecord>, allowed_subjects: Option<&SubjectFilter>) -> Self {
        let courses: Vec<CourseRecord> = courses
            .into_iter()
            .filter(|course| subject_allowed(&course.subject, allowed_subjects))
            .collect();

        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, course) in courses.iter().enumerate() {
            let text = format!(
                "{} {} {} {}",
                course.code, course.subject, course.title, course.description
            );
            for token in tokenize_text(&text) {
                postings.entry(token).or_default().push(position);
            }
        }

        Self { courses, postings }
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    /// Scores every course by the fraction of distinct query tokens it contains.
    ///
    /// Results below `threshold` or outside `allowed_subjects` are dropped; the rest
    /// are ordered by score, best first, then by course code.
    pub fn search(
        &self,
        query: &str,
        threshold: f32,
        allowed_subjects: Option<&SubjectFilter>,
    ) -> Vec<CourseHit> {
        let query_tokens: HashSet<String> = tokenize_query(query).into_iter().collect();
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut course_scores: HashMap<usize, usize> = HashMap::new();
        for token in query_tokens.iter() {
            if let Some(positions) = self.postings.get(token) {
                for position in positions {
                    *course_scores.entry(*position).or_insert(0) += 1;
                }
            }
        }

        let total = query_tokens.len() as f32;
        let mut results: Vec<CourseHit> = course_scores
            .into_iter()
            .map(|(position, matched)| (&self.courses[position], matched as f32 / total))
            .filter(|(course, score)| {
                *score >= threshold && subject_allowed(&course.subject, allowed_subjects)
            })
            .map(|(course, score)| CourseHit {
                code: course.code.clone(),
                title: course.title.clone(),
                subject: course.subject.clone(),
                score,
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.code.cmp(&b.code)));
        results
    }
}

fn subject_allowed(subject: &str, allowed_subjects: Option<&SubjectFilter>) -> bool {
    allowed_subjects.map_or(true, |allowed| allowed.contains(subject))
}

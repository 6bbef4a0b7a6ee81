use serde::Serialize;

/// Platform-wide course statistics for the admin dashboard.
/// Recomputed on every call.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminDashboardStats {
    pub total_courses: u64,
    pub pending_courses: u64,
    pub approved_courses: u64,
    pub rejected_courses: u64,
    /// Number of distinct instructors with at least one course.
    pub total_instructors: u64,
}

/// Per-instructor course statistics for the instructor dashboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct InstructorDashboardStats {
    pub total_courses: u64,
    pub draft_courses: u64,
    pub pending_courses: u64,
    pub approved_courses: u64,
    pub rejected_courses: u64,
}

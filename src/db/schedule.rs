//! Types for scheduled tasks.

use serde::{Deserialize, Serialize};

/// Type of scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledTaskType {
    /// Publish a piece of content at its scheduled time. The target is
    /// `kind:slug`, e.g. `project:villa-aurelia`.
    Publish,
    InstagramRefresh,
    OrphanSweep,
}

impl ScheduledTaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduledTaskType::Publish => "Publish",
            ScheduledTaskType::InstagramRefresh => "InstagramRefresh",
            ScheduledTaskType::OrphanSweep => "OrphanSweep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Publish" => Some(ScheduledTaskType::Publish),
            "InstagramRefresh" => Some(ScheduledTaskType::InstagramRefresh),
            "OrphanSweep" => Some(ScheduledTaskType::OrphanSweep),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScheduledTaskType::Publish => "Scheduled Publish",
            ScheduledTaskType::InstagramRefresh => "Instagram Refresh",
            ScheduledTaskType::OrphanSweep => "Orphan Sweep",
        }
    }
}

/// Status of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl ScheduleStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ScheduleStatus::Pending),
            "running" => Some(ScheduleStatus::Running),
            "completed" => Some(ScheduleStatus::Completed),
            "cancelled" => Some(ScheduleStatus::Cancelled),
            "failed" => Some(ScheduleStatus::Failed),
            _ => None,
        }
    }
}

/// A scheduled task record.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ScheduledTask {
    pub id: i64,
    pub task_type: ScheduledTaskType,
    pub target: String,
    pub scheduled_at: String,
    pub hours_start: Option<u8>,
    pub hours_end: Option<u8>,
    pub status: ScheduleStatus,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub error_message: Option<String>,
}

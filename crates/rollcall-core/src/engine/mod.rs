//! Attendance reconciliation engine.
//!
//! Pure, synchronous stages applied per learner per school day:
//!
//! 1. `schedule`: free-form class hours → `ScheduleTemplate`
//! 2. `window`: template + calendar date → `ClassWindow`
//! 3. `presence`: window + ordered timeline → minutes inside
//! 4. `classify`: minutes + planned absence + threshold → `DailyRecord`
//! 5. `aggregate`: per-student and per-day totals, attendance rate
//!
//! `calendar` supplies the school-day list and local day boundaries.
//! Nothing here performs I/O or keeps state between calls.

pub mod aggregate;
pub mod calendar;
pub mod classify;
pub mod presence;
pub mod schedule;
pub mod window;

pub use aggregate::{
    attendance_rate, build_report, build_student_report, column_totals, StudentInput,
    StudentOutcome,
};
pub use calendar::{day_bounds, month_bounds, month_days, month_label, month_name};
pub use classify::classify;
pub use presence::calculate_minutes_inside;
pub use schedule::{parse_class_schedule, parse_time_string};
pub use window::build_class_window;

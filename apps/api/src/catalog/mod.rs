// Pass-through to the backend's CV and job storage and its statistics,
// so a front-end only talks to this service. Job lists are filtered here.

pub mod handlers;
pub mod job_filter;

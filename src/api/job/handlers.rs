use actix_web::{
    HttpResponse, get, post,
    web::{Data, ServiceConfig, scope},
};
use actix_web_validator::Json;

use super::models::{JobComplete, JobStart};
use super::service::{JobService, ServiceError};

/// A crew reports that it started a job
#[post("/job-start")]
async fn job_start(
    service: Data<JobService>,
    start: Json<JobStart>,
) -> Result<HttpResponse, ServiceError> {
    service.start_job(&start).await?;
    Ok(HttpResponse::Ok().finish())
}

/// A crew reports that a job finished.
/// Unknown jobs and crews are acknowledged like any other completion.
#[post("/job-complete")]
async fn job_complete(
    service: Data<JobService>,
    complete: Json<JobComplete>,
) -> Result<HttpResponse, ServiceError> {
    service.complete_job(&complete).await?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/active-jobs")]
async fn active_jobs(service: Data<JobService>) -> Result<HttpResponse, ServiceError> {
    let jobs = service.active_jobs().await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/scoreboard")]
async fn scoreboard(service: Data<JobService>) -> Result<HttpResponse, ServiceError> {
    let crews = service.scoreboard().await?;
    Ok(HttpResponse::Ok().json(crews))
}

pub fn webhook_config(config: &mut ServiceConfig) {
    config.service(scope("/webhook").service(job_start).service(job_complete));
}

pub fn query_config(config: &mut ServiceConfig) {
    config.service(scope("/api").service(active_jobs).service(scoreboard));
}

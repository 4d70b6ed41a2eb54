// src/jobs/tests/job_service_tests.rs

#[cfg(test)]
mod tests {
    use crate::common::migrations::test_pool;
    use crate::common::ApiError;
    use crate::jobs::models::*;
    use crate::jobs::services::job_service::{
        average_day_rate, build_job_filter, page_bounds, requested_slugs, FilterArg,
    };
    use crate::jobs::services::JobService;
    use serde_json::json;

    fn job(title: &str, company: &str) -> CreateJob {
        CreateJob {
            title: title.to_string(),
            company_name: company.to_string(),
            url: format!("https://jobs.example.com/{}", title.len()),
            ..Default::default()
        }
    }

    async fn seeded_service() -> JobService {
        let service = JobService::new(test_pool().await);

        service
            .create_job(CreateJob {
                location: Some("London, UK".to_string()),
                compensation: Some("£1000".to_string()),
                posted_date: Some("2025-03-01".to_string()),
                skills_required: Some(vec!["IFRS".to_string(), "M&A".to_string()]),
                seniority_level: Some("C-Suite".to_string()),
                company_domain: Some("acme.com".to_string()),
                role_category: Some("Finance".to_string()),
                ..job("Interim CFO", "Acme")
            })
            .await
            .unwrap();

        service
            .create_job(CreateJob {
                location: Some("Manchester".to_string()),
                is_remote: Some(true),
                compensation: Some("$800 per day".to_string()),
                posted_date: Some("2025-04-01".to_string()),
                is_fractional: Some(true),
                company_domain: Some("acme.com".to_string()),
                city: Some("Manchester".to_string()),
                role_category: Some("Technology".to_string()),
                ..job("Fractional CTO", "Acme")
            })
            .await
            .unwrap();

        service
            .create_job(CreateJob {
                compensation: Some("Competitive".to_string()),
                is_interim: Some(false),
                ..job("Head of Sales", "Globex")
            })
            .await
            .unwrap();

        service
            .create_job(CreateJob {
                is_active: Some(false),
                location: Some("London".to_string()),
                ..job("Closed Role", "Initech")
            })
            .await
            .unwrap();

        service
    }

    #[test]
    fn test_build_job_filter_combines_conditions() {
        let filter = JobFilter {
            title: Some("cfo".to_string()),
            location: Some("London".to_string()),
            remote: Some(true),
            skills: Some("IFRS, M&A".to_string()),
            ..Default::default()
        };

        let (sql, args) = build_job_filter(&filter);

        assert!(sql.starts_with(" WHERE is_active = 1"));
        assert!(sql.contains("title LIKE ?"));
        assert!(sql.contains("(location LIKE ? OR city LIKE ?)"));
        assert!(sql.contains("is_remote = 1 OR workplace_type = 'Remote'"));
        assert!(sql.contains("(skills_required LIKE ? OR skills_required LIKE ?)"));
        assert_eq!(args.len(), 5);
        assert_eq!(args[0], FilterArg::Text("%cfo%".to_string()));
        assert_eq!(args[4], FilterArg::Text("%\"M&A\"%".to_string()));
    }

    #[test]
    fn test_page_bounds_clamps() {
        let default = page_bounds(&JobFilter::default());
        assert_eq!(default, (20, 0));

        let clamped = page_bounds(&JobFilter {
            limit: Some(500),
            offset: Some(-3),
            ..Default::default()
        });
        assert_eq!(clamped, (100, 0));

        let minimum = page_bounds(&JobFilter {
            limit: Some(0),
            ..Default::default()
        });
        assert_eq!(minimum.0, 1);
    }

    #[test]
    fn test_average_day_rate() {
        assert_eq!(average_day_rate(["£1000", "$800 per day", "Competitive"]), Some(900));
        assert_eq!(average_day_rate(["£1,250", "1000"]), Some(1125));
        assert_eq!(average_day_rate(["DOE", "up to £900"]), None);
        assert_eq!(average_day_rate(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_requested_slugs() {
        let many: Vec<String> = (0..15).map(|i| format!("job-{}", i)).collect();
        let value = json!(many);
        assert_eq!(requested_slugs(Some(&value)).len(), 10);

        assert!(requested_slugs(None).is_empty());
        assert!(requested_slugs(Some(&json!("job-1"))).is_empty());
        assert!(requested_slugs(Some(&json!([]))).is_empty());
    }

    #[tokio::test]
    async fn test_create_job_derives_unique_slugs() {
        let service = JobService::new(test_pool().await);

        let first = service.create_job(job("Interim CFO", "Acme Ltd")).await.unwrap();
        let second = service.create_job(job("Interim CFO", "Acme Ltd")).await.unwrap();

        assert_eq!(first.slug, "interim-cfo-acme-ltd");
        assert!(second.slug.starts_with("interim-cfo-acme-ltd-"));
        assert_ne!(first.slug, second.slug);
        assert!(first.id.starts_with("J_"));
        assert_eq!(first.external_id, first.id);
        assert_eq!(first.is_interim, Some(1));
        assert_eq!(first.is_active, Some(1));
    }

    #[tokio::test]
    async fn test_create_job_rejects_taken_explicit_slug() {
        let service = JobService::new(test_pool().await);
        service
            .create_job(CreateJob {
                slug: Some("interim-cfo".to_string()),
                ..job("Interim CFO", "Acme")
            })
            .await
            .unwrap();

        let result = service
            .create_job(CreateJob {
                slug: Some("Interim CFO".to_string()),
                ..job("Another CFO", "Globex")
            })
            .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_list_jobs_filters_and_paginates() {
        let service = seeded_service().await;

        let all = service.list_jobs(&JobFilter::default()).await.unwrap();
        assert_eq!(all.pagination.total, 3);
        // No posted_date means "posted now"
        assert_eq!(all.jobs[0].title, "Head of Sales");
        assert_eq!(all.jobs[2].title, "Interim CFO");

        let london = service
            .list_jobs(&JobFilter {
                location: Some("london".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(london.pagination.total, 1);
        assert_eq!(london.jobs[0].title, "Interim CFO");

        let remote = service
            .list_jobs(&JobFilter {
                remote: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(remote.jobs.len(), 1);
        assert_eq!(remote.jobs[0].title, "Fractional CTO");

        let skills = service
            .list_jobs(&JobFilter {
                skills: Some("ifrs".to_string()),
                seniority: Some("c-suite".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(skills.jobs.len(), 1);

        let page = service
            .list_jobs(&JobFilter {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.jobs[0].title, "Fractional CTO");
        assert_eq!(
            page.pagination,
            Pagination {
                limit: 1,
                offset: 1,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn test_featured_and_stats() {
        let service = seeded_service().await;

        let featured = service.featured_jobs().await.unwrap();
        let titles: Vec<&str> = featured.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Fractional CTO", "Interim CFO"]);

        let stats = service.stats().await.unwrap();
        assert_eq!(
            stats,
            JobStats {
                total: 2,
                london_jobs: 1,
                remote_jobs: 1,
                avg_day_rate: Some(900),
            }
        );
    }

    #[tokio::test]
    async fn test_get_by_slug_hides_inactive_jobs() {
        let service = seeded_service().await;

        let job = service.get_by_slug("interim-cfo-acme").await.unwrap();
        assert_eq!(job.company_name, "Acme");

        let closed = service.get_by_slug("closed-role-initech").await;
        assert!(matches!(closed, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_jobs_by_slugs_returns_active_cards() {
        let service = seeded_service().await;

        let cards = service
            .jobs_by_slugs(&[
                "interim-cfo-acme".to_string(),
                "closed-role-initech".to_string(),
                "missing".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].company, "Acme");
        let value = serde_json::to_value(&cards[0]).unwrap();
        assert_eq!(value["is_remote"], false);
    }

    #[tokio::test]
    async fn test_company_jobs_collects_stats() {
        let service = seeded_service().await;

        let page = service.company_jobs("acme.com").await.unwrap();
        assert_eq!(page.name, "Acme");
        assert_eq!(page.stats.total_jobs, 2);
        assert_eq!(page.stats.role_categories, vec!["Technology", "Finance"]);
        assert_eq!(page.stats.locations, vec!["Manchester", "London, UK"]);
        assert!(page.brand.is_none());

        let missing = service.company_jobs("nowhere.com").await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_job() {
        let service = seeded_service().await;
        let job = service.get_by_slug("interim-cfo-acme").await.unwrap();

        let updated = service
            .update_job(
                &job.id,
                UpdateJob {
                    compensation: Some("£1,200/day".to_string()),
                    requirements: Some(vec!["ACA".to_string()]),
                    is_remote: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.compensation.as_deref(), Some("£1,200/day"));
        assert_eq!(updated.requirements.as_deref(), Some("[\"ACA\"]"));
        assert_eq!(updated.is_remote, Some(1));
        assert_eq!(updated.title, "Interim CFO");
        assert!(updated.updated_date.is_some());

        service.delete_job(&job.id).await.unwrap();
        let again = service.delete_job(&job.id).await;
        assert!(matches!(again, Err(ApiError::NotFound(_))));

        let missing = service.update_job("J_NOPE00", UpdateJob::default()).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }
}

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{sitemap_has, TestApp};

fn nurse_posting() -> serde_json::Value {
    json!({
        "title": "Senior Nurse",
        "description": "Lead a 24-bed med-surg unit on day shift.",
        "company": "Acme Health",
        "location": "Austin, TX",
        "salary_min": "$85,000",
        "salary_max": "$110,000",
        "employment_type": "Full-time",
        "categories": ["registered nurse", null, "Travel"],
        "is_approved": true
    })
}

#[tokio::test]
async fn employer_submission_waits_for_approval() {
    let app = TestApp::new();

    let (status, _) = app
        .send(Method::POST, "/api/employer/jobs", None, Some(nurse_posting()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let employer = app.employer_token();
    let (status, created) = app
        .send(
            Method::POST,
            "/api/employer/jobs",
            Some(&employer),
            Some(nurse_posting()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["is_approved"], false);
    assert_eq!(created["categories"], json!(["Nursing", "Travel"]));
    let slug = created["slug"].as_str().unwrap().to_string();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(slug.starts_with("senior-nurse-job-at-acme-health-in-austin-tx-"));

    let (status, _) = app
        .send(Method::GET, &format!("/api/jobs/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/approve", id),
            Some(&employer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token();
    let (status, approved) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/approve", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["is_approved"], true);

    let (status, detail) = app
        .send(Method::GET, &format!("/api/jobs/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["view_count"], 1);
    assert!(detail["canonical_categories"]
        .as_array()
        .unwrap()
        .contains(&json!("nursing")));
}

#[tokio::test]
async fn soft_delete_hides_posting_until_restored() {
    let app = TestApp::new();
    let admin = app.admin_token();
    let created = app.admin_create(nurse_posting()).await;
    let slug = created["slug"].as_str().unwrap().to_string();
    let id = created["id"].as_str().unwrap().to_string();

    assert!(sitemap_has(&app.sitemap().await, &slug));

    let (status, deleted) = app
        .send(Method::DELETE, &format!("/api/admin/jobs/{}", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["is_deleted"], true);

    let (status, _) = app
        .send(Method::GET, &format!("/api/jobs/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!sitemap_has(&app.sitemap().await, &slug));

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/approve", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = app
        .send(
            Method::GET,
            "/api/admin/jobs?approved_only=false&include_deleted=true",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);

    let (status, restored) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/restore", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["is_deleted"], false);
    assert_eq!(restored["is_approved"], true);

    let (status, _) = app
        .send(Method::GET, &format!("/api/jobs/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(sitemap_has(&app.sitemap().await, &slug));
}

#[tokio::test]
async fn editing_the_title_keeps_the_url() {
    let app = TestApp::new();
    let admin = app.admin_token();
    let created = app.admin_create(nurse_posting()).await;
    let slug = created["slug"].as_str().unwrap().to_string();
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/api/admin/jobs/{}", id),
            Some(&admin),
            Some(json!({ "title": "Charge Nurse", "company": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Charge Nurse");
    assert_eq!(updated["company"], serde_json::Value::Null);
    assert_eq!(updated["slug"], slug.as_str());

    let (status, detail) = app
        .send(Method::GET, &format!("/api/jobs/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Charge Nurse");

    let (status, regenerated) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/regenerate-slug", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_slug = regenerated["slug"].as_str().unwrap();
    assert!(new_slug.starts_with("charge-nurse-in-austin-tx-"));

    let (status, _) = app
        .send(Method::GET, &format!("/api/jobs/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn raw_label_filter_and_canonical_category_pages() {
    let app = TestApp::new();
    app.admin_create(json!({
        "title": "Retail Pharmacist",
        "description": "Verify prescriptions and counsel patients.",
        "categories": ["pharmacist"],
        "is_approved": true
    }))
    .await;
    app.admin_create(json!({
        "title": "Remote Medical Coder",
        "description": "Code outpatient encounters from home.",
        "categories": ["Healthcare Administration"],
        "is_approved": true
    }))
    .await;

    let (_, exact) = app
        .send(Method::GET, "/api/jobs?category=Pharmacy", None, None)
        .await;
    assert_eq!(exact["total"], 1);
    let (_, variant) = app
        .send(Method::GET, "/api/jobs?category=pharmacy", None, None)
        .await;
    assert_eq!(variant["total"], 0);

    let (status, pharmacy) = app
        .send(Method::GET, "/api/categories/pharmacy", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pharmacy["category"]["name"], "Pharmacy Jobs");
    assert_eq!(pharmacy["category"]["job_count"], 1);

    let (_, remote) = app
        .send(Method::GET, "/api/categories/remote-jobs", None, None)
        .await;
    assert_eq!(remote["category"]["job_count"], 1);
    assert_eq!(remote["items"][0]["title"], "Remote Medical Coder");

    let (_, listings) = app.send(Method::GET, "/api/categories", None, None).await;
    let non_clinical = listings
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["slug"] == "non-clinical-jobs")
        .unwrap()
        .clone();
    assert_eq!(non_clinical["job_count"], 1);

    let (status, _) = app
        .send(Method::GET, "/api/categories/astronauts", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let admin = app.admin_token();
    let (_, distribution) = app
        .send(
            Method::GET,
            "/api/admin/categories/distribution",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(distribution["labels"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn job_metadata_and_external_apply() {
    let app = TestApp::new();
    let created = app
        .admin_create(json!({
            "title": "Travel ICU Nurse",
            "description": "13-week ICU assignment.",
            "company": "Wayfare Staffing",
            "location": "Denver, CO",
            "salary_min": "Negotiable",
            "is_external": true,
            "external_url": "https://careers.wayfare.example/apply/42",
            "is_approved": true
        }))
        .await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let (status, meta) = app
        .send(Method::GET, &format!("/api/jobs/{}/meta", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        meta["canonical_url"],
        format!("{}/jobs/{}", common::SITE_URL, slug)
    );
    assert_eq!(meta["json_ld"]["@type"], "JobPosting");
    assert!(meta["json_ld"].get("baseSalary").is_none());

    let (status, applied) = app
        .send(Method::POST, &format!("/api/jobs/{}/apply", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applied["application_count"], 1);
    assert_eq!(
        applied["redirect_url"],
        "https://careers.wayfare.example/apply/42"
    );

    let admin = app.admin_token();
    let (status, _) = app
        .send(
            Method::POST,
            "/api/admin/jobs",
            Some(&admin),
            Some(json!({
                "title": "Plain Link",
                "description": "x",
                "is_external": true,
                "external_url": "http://insecure.example/apply",
                "is_approved": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn purge_needs_explicit_confirmation() {
    let app = TestApp::new();
    let admin = app.admin_token();
    app.admin_create(nurse_posting()).await;
    app.admin_create(nurse_posting()).await;

    let (status, _) = app
        .send(Method::DELETE, "/api/admin/jobs", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, purged) = app
        .send(Method::DELETE, "/api/admin/jobs?confirm=true", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(purged["removed"], 2);

    let (_, listed) = app.send(Method::GET, "/api/jobs", None, None).await;
    assert_eq!(listed["total"], 0);
}

#[tokio::test]
async fn published_blog_posts_are_served_and_mapped() {
    let app = TestApp::new();
    let admin = app.admin_token();
    let (status, post) = app
        .send(
            Method::POST,
            "/api/admin/blog",
            Some(&admin),
            Some(json!({
                "title": "How to Land a Travel Nursing Contract",
                "content": "Start with your license compact status.",
                "author": "Editorial Team",
                "is_published": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let slug = post["slug"].as_str().unwrap().to_string();
    assert_eq!(slug, "how-to-land-a-travel-nursing-contract");

    let (status, meta) = app
        .send(Method::GET, &format!("/api/blog/{}/meta", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(meta["json_ld"]["@type"], "Article");
    assert_eq!(meta["open_graph"]["type"], "article");

    let xml = app.sitemap().await;
    assert!(xml.contains(&format!("<loc>{}/blog/{}</loc>", common::SITE_URL, slug)));
}

#[tokio::test]
async fn health_reports_visible_postings() {
    let app = TestApp::new();
    app.admin_create(nurse_posting()).await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visible_postings"], 1);
}

#[tokio::test]
async fn reject_archive_and_unarchive_routes() {
    let app = TestApp::new();
    let admin = app.admin_token();
    let created = app.admin_create(nurse_posting()).await;
    let id = created["id"].as_str().unwrap().to_string();
    let slug = created["slug"].as_str().unwrap().to_string();

    let (status, archived) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/archive", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived["is_archived"], true);

    let (status, unarchived) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/unarchive", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unarchived["is_archived"], false);

    let (status, rejected) = app
        .send(
            Method::POST,
            &format!("/api/admin/jobs/{}/reject", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["is_approved"], false);

    let (status, _) = app
        .send(Method::GET, &format!("/api/jobs/{}", slug), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!sitemap_has(&app.sitemap().await, &slug));
}

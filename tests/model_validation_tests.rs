use portfolio_api::models::{
    ContactRequest, CreateAchievementRequest, CreateProjectRequest, Project,
    UpdateAchievementRequest, UpdateProjectRequest,
};

fn valid_project() -> CreateProjectRequest {
    CreateProjectRequest {
        title: "Portfolio Site".to_string(),
        slug: "portfolio-site".to_string(),
        description: "A personal portfolio website".to_string(),
        content: None,
        image_url: "https://images.example.com/cover.webp".to_string(),
        secondary_image_url: None,
        demo_url: None,
        github_url: None,
        duration: "3 months".to_string(),
        completion_date: "2024-06".to_string(),
        role: "Developer".to_string(),
        client: None,
        featured: false,
        technologies: vec![],
    }
}

// --- Project Validation ---

#[test]
fn test_valid_project_passes() {
    assert!(valid_project().validate().is_ok());
}

#[test]
fn test_slug_rejects_uppercase_and_spaces() {
    let mut req = valid_project();
    req.slug = "Portfolio Site".to_string();
    let errors = req.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "slug"));

    let mut req = valid_project();
    req.slug = "with_underscore".to_string();
    assert!(req.validate().is_err());

    let mut req = valid_project();
    req.slug = "ok-slug-42".to_string();
    assert!(req.validate().is_ok());
}

#[test]
fn test_short_description_rejected() {
    let mut req = valid_project();
    req.description = "too short".to_string();
    // Nine characters, minimum is ten.
    let errors = req.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "description"));
}

#[test]
fn test_content_minimum_applies_only_when_provided() {
    let mut req = valid_project();
    req.content = Some("not fifty characters".to_string());
    assert!(req.validate().is_err());

    let mut req = valid_project();
    req.content = None;
    assert!(req.validate().is_ok());

    let mut req = valid_project();
    req.content = Some(
        "A long-form body that is comfortably past the fifty character minimum.".to_string(),
    );
    assert!(req.validate().is_ok());
}

#[test]
fn test_image_url_shape_enforced() {
    let mut req = valid_project();
    req.image_url = "not a url".to_string();
    assert!(req.validate().is_err());

    let mut req = valid_project();
    req.image_url = "ftp://files.example.com/cover.png".to_string();
    assert!(req.validate().is_err());

    let mut req = valid_project();
    req.demo_url = Some("also not a url".to_string());
    assert!(req.validate().is_err());

    // Empty optional URLs are treated as absent, matching form behavior.
    let mut req = valid_project();
    req.demo_url = Some("".to_string());
    assert!(req.validate().is_ok());
}

#[test]
fn test_clean_technologies_trims_and_drops_empties() {
    let mut req = valid_project();
    req.technologies = vec![
        " Rust ".to_string(),
        "".to_string(),
        "  ".to_string(),
        "Postgres".to_string(),
    ];
    assert_eq!(req.clean_technologies(), vec!["Rust", "Postgres"]);
}

#[test]
fn test_update_validates_only_present_fields() {
    // An empty partial update is a no-op and entirely valid.
    let req = UpdateProjectRequest::default();
    assert!(req.validate().is_ok());

    let req = UpdateProjectRequest {
        title: Some("ab".to_string()),
        ..UpdateProjectRequest::default()
    };
    assert!(req.validate().is_err());
}

#[test]
fn test_update_project_request_optionality() {
    // Partial updates must serialize only the provided fields.
    let partial_update = UpdateProjectRequest {
        title: Some("New Title Only".to_string()),
        ..UpdateProjectRequest::default()
    };

    let json_output = serde_json::to_string(&partial_update).unwrap();
    assert!(json_output.contains(r#""title":"New Title Only""#));
    assert!(!json_output.contains("description"));
    assert!(!json_output.contains("technologies"));
}

// --- Achievement Validation ---

#[test]
fn test_achievement_requires_primary_image() {
    let req = CreateAchievementRequest {
        place: "Conf A".to_string(),
        product: "Widget".to_string(),
        description: "Twelve chars.".to_string(),
        image_url: "".to_string(),
        secondary_image_url: None,
    };
    let errors = req.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "image_url"));

    let req = CreateAchievementRequest {
        image_url: "https://images.example.com/award.png".to_string(),
        place: "Conf A".to_string(),
        product: "Widget".to_string(),
        description: "Twelve chars.".to_string(),
        secondary_image_url: None,
    };
    assert!(req.validate().is_ok());
}

#[test]
fn test_achievement_update_checks_present_fields() {
    let req = UpdateAchievementRequest {
        place: Some("ab".to_string()),
        ..UpdateAchievementRequest::default()
    };
    assert!(req.validate().is_err());

    let req = UpdateAchievementRequest::default();
    assert!(req.validate().is_ok());
}

// --- Contact Validation ---

#[test]
fn test_contact_email_shapes() {
    let valid = ContactRequest {
        name: "Jane".to_string(),
        email: "jane@x.com".to_string(),
        message: "Hello".to_string(),
    };
    assert!(valid.validate().is_ok());

    for bad in ["plainaddress", "missing@tld@", "@no-local.com", ""] {
        let req = ContactRequest {
            email: bad.to_string(),
            ..valid.clone()
        };
        assert!(req.validate().is_err(), "{:?} should be rejected", bad);
    }
}

#[test]
fn test_contact_requires_name_and_message() {
    let req = ContactRequest {
        name: "  ".to_string(),
        email: "jane@x.com".to_string(),
        message: "".to_string(),
    };
    let errors = req.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.field == "name"));
    assert!(errors.iter().any(|e| e.field == "message"));
}

// --- Wire Shape ---

#[test]
fn test_project_serializes_technologies_inline() {
    let project = Project {
        technologies: vec!["Rust".to_string(), "Axum".to_string()],
        ..Project::default()
    };

    let json_output = serde_json::to_string(&project).unwrap();
    assert!(json_output.contains(r#""technologies":["Rust","Axum"]"#));
}

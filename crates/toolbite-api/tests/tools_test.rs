//! Integration tests for the tool endpoints.

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use helpers::{api_path, fixtures, page_content, setup_test_app, TEST_IMAGE_CAP, TEST_PAGE_COUNT};
use std::future::IntoFuture;
use std::sync::atomic::Ordering;

fn file_part(bytes: Vec<u8>, name: &str, mime: &str) -> Part {
    Part::bytes(Bytes::from(bytes))
        .file_name(name.to_string())
        .mime_type(mime.to_string())
}

fn header_usize(response: &axum_test::TestResponse, name: &str) -> usize {
    response
        .header(name)
        .to_str()
        .unwrap()
        .parse()
        .unwrap()
}

#[tokio::test]
async fn test_missing_file_is_rejected_on_every_endpoint() {
    let app = setup_test_app().await;

    let cases = [
        ("/remove-bg", "No image provided"),
        ("/compress-image", "No image file provided."),
        ("/word-to-pdf", "No Word file was uploaded."),
        ("/convert-pdf", "No PDF provided"),
    ];

    for (path, message) in cases {
        let form = MultipartForm::new().add_text("quality", "80");
        let response = app.client().post(&api_path(path)).multipart(form).await;

        assert_eq!(response.status_code(), 400, "{}", path);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], message, "{}", path);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    assert_eq!(app.store.total_allocations(), 0);
    assert_eq!(app.calls.total(), 0);
}

#[tokio::test]
async fn test_non_multipart_body_counts_as_missing_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/convert-pdf"))
        .text("just some text")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No PDF provided");
    assert_eq!(app.store.total_allocations(), 0);
}

#[tokio::test]
async fn test_file_under_wrong_field_counts_as_missing_file() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "file",
        file_part(fixtures::create_test_pdf(), "doc.pdf", "application/pdf"),
    );
    let response = app
        .client()
        .post(&api_path("/convert-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.calls.rasterize.load(Ordering::SeqCst), 0);
    assert_eq!(app.store.total_allocations(), 0);
}

#[tokio::test]
async fn test_duplicate_file_field_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("image", file_part(fixtures::create_test_png(8, 8), "a.png", "image/png"))
        .add_part("image", file_part(fixtures::create_test_png(8, 8), "b.png", "image/png"));
    let response = app
        .client()
        .post(&api_path("/remove-bg"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.calls.total(), 0);
}

#[tokio::test]
async fn test_remove_background_returns_png_and_releases_storage() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "image",
        file_part(fixtures::create_test_jpeg(32, 32), "cat.jpg", "image/jpeg"),
    );
    let response = app
        .client()
        .post(&api_path("/remove-bg"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(&response.as_bytes()[..], helpers::FAKE_PNG);
    assert_eq!(app.calls.background.load(Ordering::SeqCst), 1);
    assert_eq!(app.store.total_allocations(), 1);
    app.assert_storage_released();
}

#[tokio::test]
async fn test_remove_background_engine_failure_is_generic() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "image",
        file_part(fixtures::CORRUPT_INPUT.to_vec(), "cat.jpg", "image/jpeg"),
    );
    let response = app
        .client()
        .post(&api_path("/remove-bg"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Background removal failed");
    assert_eq!(body["code"], "ENGINE_ERROR");
    assert!(!response.text().contains(app.store.base_path().to_str().unwrap()));
    app.assert_storage_released();
}

#[tokio::test]
async fn test_compress_jpeg_shrinks_and_reports_sizes() {
    let app = setup_test_app().await;
    let original = fixtures::create_test_jpeg(96, 96);

    let form = MultipartForm::new()
        .add_part("image", file_part(original.clone(), "holiday.jpg", "image/jpeg"))
        .add_text("quality", "70");
    let response = app
        .client()
        .post(&api_path("/compress-image"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"compressed_holiday.jpg\""
    );

    let original_size = header_usize(&response, "x-original-size");
    let compressed_size = header_usize(&response, "x-compressed-size");
    assert_eq!(original_size, original.len());
    assert!(compressed_size < original_size);
    assert_eq!(response.as_bytes().len(), compressed_size);

    // Nothing staged for in-memory recompression
    assert_eq!(app.store.total_allocations(), 0);
}

#[tokio::test]
async fn test_compress_never_grows_png() {
    let app = setup_test_app().await;
    let original = fixtures::create_test_png(24, 24);

    let form = MultipartForm::new()
        .add_part("image", file_part(original.clone(), "icon.png", "image/png"));
    let response = app
        .client()
        .post(&api_path("/compress-image"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");

    let original_size = header_usize(&response, "x-original-size");
    let compressed_size = header_usize(&response, "x-compressed-size");
    assert_eq!(original_size, original.len());
    assert!(compressed_size <= original_size);
    if compressed_size == original_size {
        assert_eq!(&response.as_bytes()[..], original.as_slice());
    }
}

#[tokio::test]
async fn test_compress_non_image_asks_for_valid_image() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "image",
        file_part(b"definitely not an image".to_vec(), "notes.txt", "text/plain"),
    );
    let response = app
        .client()
        .post(&api_path("/compress-image"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["error"],
        "Could not process this image format. Please upload a valid JPG or PNG."
    );
}

#[tokio::test]
async fn test_compress_quality_out_of_range_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("image", file_part(fixtures::create_test_jpeg(16, 16), "a.jpg", "image/jpeg"))
        .add_text("quality", "150");
    let response = app
        .client()
        .post(&api_path("/compress-image"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Quality must be an integer between 1 and 100");
}

#[tokio::test]
async fn test_compress_non_numeric_quality_uses_default() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("image", file_part(fixtures::create_test_jpeg(32, 32), "a.jpg", "image/jpeg"))
        .add_text("quality", "high");
    let response = app
        .client()
        .post(&api_path("/compress-image"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_compress_over_cap_is_payload_too_large() {
    let app = setup_test_app().await;

    // Just over the cap: passes the body limit, stopped by the dispatcher
    let form = MultipartForm::new().add_part(
        "image",
        file_part(vec![0u8; TEST_IMAGE_CAP + 1], "big.bmp", "image/bmp"),
    );
    let response = app
        .client()
        .post(&api_path("/compress-image"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 413);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");

    // Far over the cap: cut off while reading the body
    let form = MultipartForm::new().add_part(
        "image",
        file_part(vec![0u8; TEST_IMAGE_CAP * 2], "huge.bmp", "image/bmp"),
    );
    let response = app
        .client()
        .post(&api_path("/compress-image"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 413);

    assert_eq!(app.store.total_allocations(), 0);
}

#[tokio::test]
async fn test_word_to_pdf_returns_attachment_and_closes_session() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "word",
        file_part(
            fixtures::create_test_docx(),
            "report.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
    );
    let response = app
        .client()
        .post(&api_path("/word-to-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"converted.pdf\""
    );
    assert!(response.as_bytes().starts_with(b"%PDF"));

    assert_eq!(app.calls.sessions_opened.load(Ordering::SeqCst), 1);
    assert_eq!(app.calls.sessions_closed.load(Ordering::SeqCst), 1);
    app.assert_storage_released();
}

#[tokio::test]
async fn test_word_to_pdf_is_not_bound_by_image_cap() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "word",
        file_part(vec![b'w'; TEST_IMAGE_CAP * 2], "thesis.docx", "application/octet-stream"),
    );
    let response = app
        .client()
        .post(&api_path("/word-to-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.store.total_allocations(), 2);
    app.assert_storage_released();
}

#[tokio::test]
async fn test_word_to_pdf_failure_releases_storage() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "word",
        file_part(fixtures::CORRUPT_INPUT.to_vec(), "broken.docx", "application/octet-stream"),
    );
    let response = app
        .client()
        .post(&api_path("/word-to-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Failed to convert document.");
    assert_eq!(app.calls.sessions_opened.load(Ordering::SeqCst), 0);
    app.assert_storage_released();
}

#[tokio::test]
async fn test_convert_pdf_returns_pages_in_order() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "pdf",
        file_part(fixtures::create_test_pdf(), "slides.pdf", "application/pdf"),
    );
    let response = app
        .client()
        .post(&api_path("/convert-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), TEST_PAGE_COUNT as usize);

    for (index, image) in images.iter().enumerate() {
        let expected = format!(
            "data:image/png;base64,{}",
            STANDARD.encode(page_content(index as u32 + 1))
        );
        assert_eq!(image.as_str().unwrap(), expected);
    }

    app.assert_storage_released();
}

#[tokio::test]
async fn test_convert_pdf_page_subset() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("pdf", file_part(fixtures::create_test_pdf(), "a.pdf", "application/pdf"))
        .add_text("pages", "10, 2");
    let response = app
        .client()
        .post(&api_path("/convert-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let images: Vec<&str> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        images,
        vec![
            format!("data:image/png;base64,{}", STANDARD.encode(page_content(2))),
            format!("data:image/png;base64,{}", STANDARD.encode(page_content(10))),
        ]
    );
}

#[tokio::test]
async fn test_convert_pdf_page_past_end_fails() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("pdf", file_part(fixtures::create_test_pdf(), "a.pdf", "application/pdf"))
        .add_text("pages", format!("2, {}", TEST_PAGE_COUNT + 1));
    let response = app
        .client()
        .post(&api_path("/convert-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "PDF conversion failed.");
    assert!(!response.text().contains("out of range"));
    app.assert_storage_released();
}

#[tokio::test]
async fn test_convert_pdf_invalid_pages_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("pdf", file_part(fixtures::create_test_pdf(), "a.pdf", "application/pdf"))
        .add_text("pages", "first");
    let response = app
        .client()
        .post(&api_path("/convert-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.calls.rasterize.load(Ordering::SeqCst), 0);
    assert_eq!(app.store.total_allocations(), 0);
}

#[tokio::test]
async fn test_convert_pdf_engine_failure_releases_storage() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "pdf",
        file_part(fixtures::CORRUPT_INPUT.to_vec(), "broken.pdf", "application/pdf"),
    );
    let response = app
        .client()
        .post(&api_path("/convert-pdf"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "PDF conversion failed.");
    app.assert_storage_released();
}

#[tokio::test]
async fn test_concurrent_requests_leave_nothing_behind() {
    let app = setup_test_app().await;

    let requests = (0..8).map(|i| {
        let form = MultipartForm::new().add_part(
            "pdf",
            file_part(fixtures::create_test_pdf(), &format!("doc-{}.pdf", i), "application/pdf"),
        );
        app.client()
            .post(&api_path("/convert-pdf"))
            .multipart(form)
            .into_future()
    });

    let responses = futures::future::join_all(requests).await;
    for response in responses {
        assert_eq!(response.status_code(), 200);
    }

    // Staged input plus output directory per request
    assert_eq!(app.store.total_allocations(), 16);
    app.assert_storage_released();
}

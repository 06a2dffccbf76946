use nss_portal::attachments::{
    CleanupOutcome, MAX_UPLOAD_BYTES, UploadError, UploadKind, extension, secure_filename,
    unique_filename, validate_upload,
};
use uuid::Uuid;

#[test]
fn extension_extraction() {
    assert_eq!(extension("photo.PNG"), Some("png".to_string()));
    assert_eq!(extension("archive.tar.gz"), Some("gz".to_string()));
    assert_eq!(extension("noext"), None);
    assert_eq!(extension(".hidden"), None);
    assert_eq!(extension("trailing."), None);
}

#[test]
fn accepts_allowed_images_and_documents() {
    assert_eq!(
        validate_upload("camp.jpg", "image/jpeg", 1024, UploadKind::Image),
        Ok(())
    );
    assert_eq!(
        validate_upload("report.pdf", "application/pdf", 1024, UploadKind::Document),
        Ok(())
    );
    assert_eq!(
        validate_upload(
            "minutes.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            1024,
            UploadKind::Document
        ),
        Ok(())
    );
}

#[test]
fn rejects_wrong_extension() {
    assert_eq!(
        validate_upload("malware.exe", "image/png", 10, UploadKind::Image),
        Err(UploadError::UnsupportedExtension("exe".to_string()))
    );
    // A document extension is not acceptable where an image is expected.
    assert_eq!(
        validate_upload("report.pdf", "application/pdf", 10, UploadKind::Image),
        Err(UploadError::UnsupportedExtension("pdf".to_string()))
    );
}

#[test]
fn rejects_mismatched_mime_type() {
    assert_eq!(
        validate_upload("photo.png", "text/html", 10, UploadKind::Image),
        Err(UploadError::UnsupportedMimeType("text/html".to_string()))
    );
}

#[test]
fn rejects_oversized_files() {
    assert_eq!(
        validate_upload("big.png", "image/png", MAX_UPLOAD_BYTES + 1, UploadKind::Image),
        Err(UploadError::TooLarge)
    );
    // Exactly at the cap is still acceptable.
    assert_eq!(
        validate_upload("big.png", "image/png", MAX_UPLOAD_BYTES, UploadKind::Image),
        Ok(())
    );
}

#[test]
fn secure_filename_strips_directories() {
    assert_eq!(
        secure_filename("../../etc/passwd"),
        Some("passwd".to_string())
    );
    assert_eq!(
        secure_filename("..\\..\\windows\\system32\\cmd.exe"),
        Some("cmd.exe".to_string())
    );
}

#[test]
fn secure_filename_neutralizes_odd_characters() {
    assert_eq!(
        secure_filename("my photo (1).png"),
        Some("my_photo_1.png".to_string())
    );
    assert_eq!(secure_filename("...."), None);
    assert_eq!(secure_filename(""), None);
}

#[test]
fn unique_filename_is_prefixed_with_a_uuid() {
    let name = unique_filename("camp.jpg");
    let (prefix, rest) = name.split_once('_').unwrap();
    assert!(Uuid::parse_str(prefix).is_ok());
    assert_eq!(rest, "camp.jpg");

    // Two derivations of the same original never collide.
    assert_ne!(unique_filename("camp.jpg"), unique_filename("camp.jpg"));
}

#[test]
fn cleanup_outcome_tracks_failures() {
    let mut outcome = CleanupOutcome::default();
    assert!(outcome.is_clean());

    outcome.record_removed();
    outcome.record_failure("stale-object.png");
    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.failed, vec!["stale-object.png".to_string()]);
    assert!(!outcome.is_clean());
}

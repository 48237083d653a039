#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use image::GenericImageView;
    use pixform::{
        ConvertOptions, OutputFormat, PixformError, Preset, ResizeMode, SettingsPatch, Workspace,
    };

    fn write_test_image(file: &assert_fs::fixture::ChildPath, width: u32, height: u32) {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 100])
        });
        img.save(file.path()).unwrap();
    }

    #[test]
    fn file_batch_resizes_and_exports() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.child("first.png");
        let second = temp_dir.child("second.png");
        write_test_image(&first, 800, 600);
        write_test_image(&second, 640, 480);

        let mut workspace = Workspace::new();
        workspace.ingest_file(first.path()).unwrap();
        workspace.ingest_file(second.path()).unwrap();

        workspace.apply_preset(Preset::Social);
        workspace.update_settings(SettingsPatch {
            mode: Some(ResizeMode::Fill),
            format: Some(OutputFormat::Jpeg),
            ..Default::default()
        });

        let stats = workspace.apply_to_all().unwrap();
        assert_eq!(stats.processed, 2);
        assert!(stats.failures.is_empty());

        let out_dir = temp_dir.child("out");
        let written = workspace.export_processed(out_dir.path()).unwrap();
        assert_eq!(written.len(), 2);

        for path in &written {
            assert_eq!(path.extension().unwrap(), "jpg");
            let decoded = image::open(path).unwrap();
            assert_eq!(decoded.width(), 1080);
            assert_eq!(decoded.height(), 1080);
        }
    }

    #[test]
    fn export_deduplicates_colliding_names() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.child("a/photo.png");
        let b = temp_dir.child("b/photo.png");
        a.touch().unwrap();
        b.touch().unwrap();
        write_test_image(&a, 20, 20);
        write_test_image(&b, 30, 30);

        let mut workspace = Workspace::new();
        workspace.ingest_file(a.path()).unwrap();
        workspace.ingest_file(b.path()).unwrap();
        workspace.apply_to_all().unwrap();

        let out_dir = temp_dir.child("out");
        let written = workspace.export_processed(out_dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        assert_ne!(written[0], written[1]);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn missing_file_is_reported_not_ingested() {
        let mut workspace = Workspace::new();
        let result = workspace.ingest_file(std::path::Path::new("nonexistent.jpg"));
        assert!(result.is_err());
        assert!(workspace.registry().is_empty());
    }

    #[test]
    fn non_image_file_is_rejected_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let notes = temp_dir.child("notes.txt");
        notes.write_str("not an image").unwrap();

        let mut workspace = Workspace::new();
        let err = workspace.ingest_file(notes.path()).unwrap_err();
        assert!(matches!(err, PixformError::InvalidFileType(_)));
    }

    #[test]
    fn corrupt_image_file_fails_decode() {
        let temp_dir = TempDir::new().unwrap();
        let fake = temp_dir.child("fake.png");
        fake.write_binary(b"PNG but not really").unwrap();

        let mut workspace = Workspace::new();
        let err = workspace.ingest_file(fake.path()).unwrap_err();
        assert!(matches!(err, PixformError::DecodeFailure { .. }));
    }

    #[test]
    fn pdf_request_covers_the_selection_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.child("one.png");
        let second = temp_dir.child("two.png");
        write_test_image(&first, 10, 10);
        write_test_image(&second, 12, 12);

        let mut workspace = Workspace::new();
        let one = workspace.ingest_file(first.path()).unwrap();
        let two = workspace.ingest_file(second.path()).unwrap();
        workspace.select(two).unwrap();
        workspace.select(one).unwrap();

        let selection = workspace.selection().to_vec();
        let request = workspace
            .pdf_request(&selection, ConvertOptions::default())
            .unwrap();

        assert_eq!(request.images.len(), 2);
        let body = serde_json::to_string(&request).unwrap();
        assert!(body.contains("pageSize"));
    }
}

use crate::ArcPath;

use super::Fs;

#[tokio::test]
async fn actual_fs_write_read_remove() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Fs::spawn();
    let path = ArcPath::from(dir.path().join("file.txt").as_path());

    fs.write(path.clone(), b"hello".to_vec()).await.unwrap();
    assert_eq!(fs.read_to_string(path.clone()).await.unwrap(), "hello");
    assert_eq!(fs.size(path.clone()).await.unwrap(), 5);

    fs.append(path.clone(), b" world".to_vec()).await.unwrap();
    assert_eq!(
        fs.read_to_string(path.clone()).await.unwrap(),
        "hello world"
    );

    fs.remove_file(path.clone()).await.unwrap();
    assert!(fs.read(path).await.is_err());
}

#[tokio::test]
async fn actual_fs_mkdir_and_read_dir() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Fs::spawn();
    let sub = ArcPath::from(dir.path().join("a").join("b").as_path());

    fs.mkdir(sub.clone()).await.unwrap();
    let file = ArcPath::from(sub.join("f.log").as_path());
    fs.write(file.clone(), b"x".to_vec()).await.unwrap();

    let entries = fs.read_dir(sub).await.unwrap();
    assert_eq!(entries, vec![file]);
}

#[tokio::test]
async fn mock_fs_append_creates_missing_file() {
    let fs = Fs::mock();
    let path = ArcPath::from(std::path::Path::new("/logs/latest.log"));

    fs.append(path.clone(), b"line 1\n".to_vec()).await.unwrap();
    fs.append(path.clone(), b"line 2\n".to_vec()).await.unwrap();

    assert_eq!(
        fs.read_to_string(path).await.unwrap(),
        "line 1\nline 2\n"
    );
}

#[tokio::test]
async fn mock_fs_missing_file_errors() {
    let fs = Fs::mock();
    let path = ArcPath::from(std::path::Path::new("/nope"));
    assert!(fs.read(path.clone()).await.is_err());
    assert!(fs.size(path).await.is_err());
}

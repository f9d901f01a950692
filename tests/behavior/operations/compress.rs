use crate::*;
use bytelayer::error::{Error, Result};
use bytelayer::storage::IoPath;
use flate2::read::GzDecoder;
use libtest_mimic::Trial;
use std::io::{Cursor, Read};

pub fn tests(client: &TestClient, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_gzip_round_trip,
        test_gzip_empty_payload,
        test_gzip_container_is_standard,
        test_read_gzip_malformed_fails_on_first_read,
        test_read_gzip_missing_object_fails
    ));
}

async fn test_gzip_round_trip(client: TestClient) -> Result<()> {
    let (path, content, _) = TEST_FIXTURE.new_file();
    let path = IoPath::from(path);

    client.write_gzip(&path, &content).await?;

    let mut reader = client.read_gzip(&path).await?;
    let mut decoded = Vec::new();
    reader.read_to_end(&mut decoded)?;
    assert_eq!(content, decoded);

    Ok(())
}

async fn test_gzip_empty_payload(client: TestClient) -> Result<()> {
    let path = IoPath::from(TEST_FIXTURE.new_file_path());

    client.write_gzip(&path, &[]).await?;

    let mut reader = client.read_gzip(&path).await?;
    let mut decoded = Vec::new();
    reader.read_to_end(&mut decoded)?;
    assert!(decoded.is_empty());

    Ok(())
}

/// The stored payload must be plain RFC 1952 gzip framing, decodable by an
/// independently constructed decoder.
async fn test_gzip_container_is_standard(client: TestClient) -> Result<()> {
    let path = IoPath::from(TEST_FIXTURE.new_file_path());
    let content = b"hello world".to_vec();

    client.write_gzip(&path, &content).await?;

    let raw = client.store().operator().read(path.as_str()).await?.to_vec();
    assert_eq!(&raw[..2], &[0x1f, 0x8b], "gzip magic bytes");

    let mut decoder = GzDecoder::new(Cursor::new(raw));
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    assert_eq!(content, decoded);

    Ok(())
}

async fn test_read_gzip_malformed_fails_on_first_read(client: TestClient) -> Result<()> {
    let path = IoPath::from(TEST_FIXTURE.new_file_path());
    client
        .store()
        .operator()
        .write(path.as_str(), b"definitely not gzip".to_vec())
        .await?;

    // Obtaining the view succeeds; decoding is lazy.
    let mut reader = client.read_gzip(&path).await?;
    let mut decoded = Vec::new();
    let result = reader.read_to_end(&mut decoded);
    assert!(result.is_err(), "malformed payload must fail on first read");

    Ok(())
}

async fn test_read_gzip_missing_object_fails(client: TestClient) -> Result<()> {
    let path = IoPath::from(TEST_FIXTURE.new_file_path());

    let result = client.read_gzip(&path).await;
    let err = result.err().expect("read_gzip of missing object");
    assert!(
        matches!(err.root_cause(), Error::PathNotFound { .. }),
        "expected PathNotFound, got {err}"
    );

    Ok(())
}

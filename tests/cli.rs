mod cli {
    #![allow(non_snake_case)]

    use assert_cmd::prelude::*;
    use predicates::str::contains;

    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::process::Command;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const NAME: &str = "feedex";

    /// Stand-in for curl: `*/old` redirects to `/`, hosts named `gone`
    /// fail with exit 6, the status probe always answers 200.
    #[cfg(unix)]
    const FAKE_CURL: &str = r#"#!/bin/sh
for last; do :; done
case "$*" in
  *%{http_code}*) printf 200; exit 0 ;;
esac
case "$last" in
  *gone*) printf 000; exit 6 ;;
  */old) printf '%s' "${last%/old}/" ;;
  *) printf '%s' "$last" ;;
esac
"#;

    #[cfg(unix)]
    const FAKE_WGET: &str = r#"#!/bin/sh
echo "Remote file exists and could contain further links," >&2
"#;

    const PAGE: &str = r#"<html><head>
<link rel="alternate" type="application/rss+xml" href="/feed.xml">
<link rel="alternate" type="application/atom+xml" href="/feed.xml">
</head></html>"#;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, body)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    /// Config file pointing the probes at the fake tools
    #[cfg(unix)]
    fn fake_tools_config(dir: &Path) -> std::io::Result<PathBuf> {
        let curl = write_script(dir, "curl", FAKE_CURL)?;
        let wget = write_script(dir, "wget", FAKE_WGET)?;
        let config = dir.join("feedex.toml");
        std::fs::write(
            &config,
            format!(
                "curl_path = \"{}\"\nwget_path = \"{}\"\n",
                curl.display(),
                wget.display()
            ),
        )?;
        Ok(config)
    }

    #[test]
    fn test_output__when_no_source_provided() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.assert()
            .failure()
            .stderr(contains("the following required arguments were not provided"));
        Ok(())
    }

    #[test]
    fn test_output__when_format_unknown() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args(["-u", "https://example.com", "-f", "xml"]);

        cmd.assert().failure().stderr(contains("invalid value 'xml'"));
        Ok(())
    }

    #[test]
    fn test_output__when_timeout_zero() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args(["-u", "https://example.com", "-t", "0", "--no-config"]);

        cmd.assert()
            .failure()
            .stderr(contains("Timeout cannot be 0"));
        Ok(())
    }

    #[test]
    fn test_output__when_tools_missing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = dir.path().join("feedex.toml");
        std::fs::write(
            &config,
            "curl_path = \"/nonexistent/feedex/curl\"\nwget_path = \"/nonexistent/feedex/wget\"\n",
        )?;
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args(["-u", "https://example.com", "--config"]).arg(&config);

        cmd.assert()
            .failure()
            .stderr(contains("Missing requirement: curl"));
        Ok(())
    }

    #[test]
    fn test_output__when_config_file_missing() -> TestResult {
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args([
            "-u",
            "https://example.com",
            "--config",
            "/nonexistent/feedex.toml",
        ]);

        cmd.assert().failure().stderr(contains("Error:"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_output__when_input_has_no_urls() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = fake_tools_config(dir.path())?;
        let mut input = tempfile::NamedTempFile::new()?;
        input.write_all(b"not a url\n\n")?;
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.arg("-i").arg(input.path()).arg("--config").arg(&config);

        cmd.assert().failure().stderr(contains("No URLs found"));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output__json_echo_follows_redirect() -> TestResult {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(PAGE)
            .create_async()
            .await;
        let dir = tempfile::tempdir()?;
        let config = fake_tools_config(dir.path())?;
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args(["-u", &(server.url() + "/old"), "-f", "json", "-e", "--config"])
            .arg(&config);

        let output = cmd.output()?;
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(
            value[server.url() + "/"],
            serde_json::json!([server.url() + "/feed.xml"])
        );
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output__txt_file_round_trips_as_input() -> TestResult {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(PAGE)
            .expect(1)
            .create_async()
            .await;
        let dir = tempfile::tempdir()?;
        let config = fake_tools_config(dir.path())?;
        let out = dir.path().join("feeds.txt");
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args(["-u", &(server.url() + "/"), "--filename"])
            .arg(&out)
            .arg("--config")
            .arg(&config);
        cmd.assert().success();

        let written = std::fs::read_to_string(&out)?;
        assert_eq!(
            written,
            format!("{}/\n\t{}/feed.xml", server.url(), server.url())
        );

        // Known feeds are kept without fetching the page again
        let mut again = Command::cargo_bin(NAME)?;
        again
            .arg("-i")
            .arg(&out)
            .arg("-e")
            .arg("--config")
            .arg(&config);
        again.assert().success().stdout(contains("/feed.xml"));
        page.assert_async().await;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_output__dead_url_reported_and_cleared() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = fake_tools_config(dir.path())?;
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args(["-u", "http://gone.example", "-e", "-c", "--config"])
            .arg(&config);

        cmd.assert()
            .success()
            .stdout("")
            .stderr(contains("Error 6: 'Could not resolve host'"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_output__dead_url_kept_empty_in_json() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = fake_tools_config(dir.path())?;
        let mut cmd = Command::cargo_bin(NAME)?;

        cmd.args(["-u", "http://gone.example", "-e", "-f", "json", "--config"])
            .arg(&config);

        let output = cmd.output()?;
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        assert!(stdout.contains("\"http://gone.example\": []"));
        assert!(stdout.contains("\"errors\""));
        Ok(())
    }
}

use hcb::Highlighter;
use hcb_static::{ProcessError, ProcessOptions, Processor};
use indoc::indoc;
use std::path::Path;

const PAGE: &str = indoc! {r#"
    <!DOCTYPE html>
    <html><body>
    <pre><code class="language-rust">fn main() {}</code></pre>
    <pre><code class="language-klingon">qapla'</code></pre>
    </body></html>
"#};

const PLAIN_PAGE: &str = "<html><body><p>No code here.</p></body></html>\n";

fn write_site(root: &Path) {
    fs_err::create_dir_all(root.join("posts/2024")).unwrap();
    fs_err::write(root.join("index.html"), PAGE).unwrap();
    fs_err::write(root.join("posts/2024/hello.html"), PAGE).unwrap();
    fs_err::write(root.join("posts/about.html"), PLAIN_PAGE).unwrap();
    fs_err::write(root.join("posts/style.css"), "pre{}").unwrap();
}

#[test]
fn test_process_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    let processor = Processor::new(
        ProcessOptions {
            input_dir: dir.path().to_path_buf(),
            output_dir: None,
            verbose: false,
        },
        Highlighter::new(),
    );
    let stats = processor.process().unwrap();

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.blocks_highlighted, 4);
    assert_eq!(stats.unsupported_languages, vec!["klingon".to_string()]);

    let index = fs_err::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.contains(r#"<code class="hljs language-rust">"#));
    assert!(index.contains(r#"<code class="hljs language-klingon">qapla&#39;</code>"#));
    assert_eq!(
        fs_err::read_to_string(dir.path().join("posts/about.html")).unwrap(),
        PLAIN_PAGE
    );
}

#[test]
fn test_process_into_copy_leaves_input() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_site(input.path());
    let out_dir = output.path().join("site");

    let processor = Processor::new(
        ProcessOptions {
            input_dir: input.path().to_path_buf(),
            output_dir: Some(out_dir.clone()),
            verbose: false,
        },
        Highlighter::new(),
    );
    let stats = processor.process().unwrap();
    assert_eq!(stats.blocks_highlighted, 4);
    assert!(stats.bytes_output > stats.bytes_input);

    assert_eq!(fs_err::read_to_string(input.path().join("index.html")).unwrap(), PAGE);
    let copied = fs_err::read_to_string(out_dir.join("posts/2024/hello.html")).unwrap();
    assert!(copied.contains("hljs language-rust"));
    assert_eq!(fs_err::read_to_string(out_dir.join("posts/style.css")).unwrap(), "pre{}");
}

#[test]
fn test_second_pass_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());
    let options = ProcessOptions {
        input_dir: dir.path().to_path_buf(),
        output_dir: None,
        verbose: false,
    };

    Processor::new(options.clone(), Highlighter::new()).process().unwrap();
    let first = fs_err::read_to_string(dir.path().join("index.html")).unwrap();

    let stats = Processor::new(options, Highlighter::new()).process().unwrap();
    assert_eq!(stats.blocks_highlighted, 0);
    assert_eq!(stats.blocks_skipped, 4);
    assert_eq!(fs_err::read_to_string(dir.path().join("index.html")).unwrap(), first);
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let processor = Processor::new(
        ProcessOptions {
            input_dir: dir.path().join("missing"),
            output_dir: None,
            verbose: false,
        },
        Highlighter::new(),
    );
    assert!(matches!(processor.process(), Err(ProcessError::NotADirectory(_))));
}

fn process_into(input: &Path, output: &Path) -> Result<hcb_static::ProcessorStats, ProcessError> {
    Processor::new(
        ProcessOptions {
            input_dir: input.to_path_buf(),
            output_dir: Some(output.to_path_buf()),
            verbose: false,
        },
        Highlighter::new(),
    )
    .process()
}

#[test]
fn test_output_containing_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("out/site");
    write_site(&input);

    let result = process_into(&input, &dir.path().join("out"));
    assert!(matches!(result, Err(ProcessError::OverlappingOutput { .. })));
    assert_eq!(fs_err::read_to_string(input.join("index.html")).unwrap(), PAGE);
}

#[test]
fn test_output_inside_input_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    let result = process_into(dir.path(), &dir.path().join("build"));
    assert!(matches!(result, Err(ProcessError::OverlappingOutput { .. })));
    assert!(!dir.path().join("build").exists());
    assert_eq!(fs_err::read_to_string(dir.path().join("index.html")).unwrap(), PAGE);
}

#[test]
fn test_output_naming_input_is_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_site(dir.path());

    let stats = process_into(dir.path(), &dir.path().join(".")).unwrap();
    assert_eq!(stats.blocks_highlighted, 4);
    assert!(
        fs_err::read_to_string(dir.path().join("index.html"))
            .unwrap()
            .contains("hljs language-rust")
    );
}

// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_org_content(sections: usize) -> String {
    let mut content = String::from("#+title: Benchmark\n\n");

    for section in 0..sections {
        content.push_str(&format!("* Section {section}\n\n"));
        content.push_str("Some paragraph content with multiple sentences. This helps create realistic document structure for benchmarking.\n\n");

        content.push_str(&format!("#+name: block-{section}\n"));
        content.push_str("#+begin_src js :tangle yes\n");
        content.push_str(&format!(
            "export const value{section} = {section};\nexport function twice{section}() {{\n    return value{section} * 2;\n}}\n"
        ));
        content.push_str("#+end_src\n\n");

        // Add an unnamed block occasionally
        if section % 3 == 0 {
            content.push_str("# scratch\n#+begin_src sh :selector test\necho scratch\n#+end_src\n\n");
        }
    }

    content
}

#[allow(dead_code)]
pub fn generate_project(root: &std::path::Path, documents: usize, sections: usize) -> Vec<std::path::PathBuf> {
    let content = generate_org_content(sections);
    (0..documents)
        .map(|i| {
            let relative = std::path::PathBuf::from(format!("notes/{}/doc{i}.org", i % 8));
            let absolute = root.join(&relative);
            std::fs::create_dir_all(absolute.parent().unwrap()).unwrap();
            std::fs::write(&absolute, &content).unwrap();
            relative
        })
        .collect()
}

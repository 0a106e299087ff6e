use std::fs;

use terminfo_gen::{
    Loader, TerminfoLoader,
    encode::encode,
    locate::search_directories,
};

/// Load and encode every terminal in the system database
#[test]
fn test_all_terminals() {
    let loader = TerminfoLoader;
    for dir in search_directories() {
        let Ok(dir) = fs::read_dir(&dir) else {
            continue;
        };
        for leaf in dir {
            let leaf = leaf.unwrap().path();
            let Ok(leaf) = fs::read_dir(&leaf) else {
                continue;
            };
            for term in leaf {
                let term_name = term.unwrap().file_name();
                let term_name = term_name.to_string_lossy();
                let (caps, desc) = loader.load(&term_name).unwrap();
                println!("terminal: {term_name} ({desc})");

                assert!(!caps.name.is_empty());
                let fields = encode(&caps);
                assert_eq!(fields[0].name, "name");
                assert_eq!(encode(&caps), fields);
                for field in fields {
                    println!("\t{}: {},", field.name, field.literal);
                }
            }
        }
    }
}

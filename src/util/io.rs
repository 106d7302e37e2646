use std::fs;
use std::path::Path;
use std::process;
use std::io::Read;

// open a file per the normal rust way, but map any errors to strings
pub fn open_file(path: &Path) -> Result<std::fs::File, String> {
    return std::fs::File::open(path).map_err(
        |_x| format!("unable to open file: {}", path.display())
    );
}

pub fn read_local_file(path: &Path) -> Result<String,String> {
    let mut file = open_file(path)?;
    let mut buffer = String::new();
    let read_result = file.read_to_string(&mut buffer);
    match read_result {
        Ok(_) => {},
        Err(x) => {
            return Err(format!("unable to read file: {}, {:?}", path.display(), x));
        }
    };
    return Ok(buffer);
}

// get the last part of the file ignoring the directory part
pub fn path_basename_as_string(path: &Path) -> String {
    return match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => String::new(),
    };
}

// true only for a regular file the current user can actually open
pub fn is_readable_file(path: &Path) -> bool {
    let metadata = match fs::metadata(path) {
        Ok(x) => x, Err(_) => return false,
    };
    if ! metadata.is_file() {
        return false;
    }
    return open_file(path).is_ok();
}

pub fn quit(s: &String) {
    // quit with a message - don't use this except in main.rs!
    eprintln!("{}", s);
    process::exit(0x01)
}

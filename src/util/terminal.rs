pub fn markdown_print(markdown: &str) {
    termimad::print_text(markdown);
}

pub fn banner(msg: &str) {
    let markdown = format!("|:-|\n\
                            |{}|\n\
                            |-", escape_cell(msg));
    markdown_print(&markdown);
}

// cells come from machine data, a stray pipe would split the row
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

pub fn two_column_markdown(header_a: &str, header_b: &str, elements: &[(String,String)]) -> String {
    let mut buffer = String::from("|:-|:-\n");
    buffer.push_str(&format!("|{}|{}\n", escape_cell(header_a), escape_cell(header_b)));
    for (a,b) in elements.iter() {
        buffer.push_str("|-|-\n");
        buffer.push_str(&format!("|{}|{}\n", escape_cell(a), escape_cell(b)));
    }
    buffer.push_str("|-|-\n");
    buffer
}

pub fn two_column_table(header_a: &str, header_b: &str, elements: &[(String,String)]) {
    markdown_print(&two_column_markdown(header_a, header_b, elements));
}

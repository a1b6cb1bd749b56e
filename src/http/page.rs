/// 编辑器页面，编译期内嵌
pub const INDEX_HTML: &str = include_str!("../../assets/index.html");

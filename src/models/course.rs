use serde::{Deserialize, Serialize};

/// 页面片段缺失时使用的占位值
///
/// 表示"该字段不可用"，不是错误
pub const NOT_AVAILABLE: &str = "N/A";

/// 课程的一个教学班（Section）
///
/// 可选字段只在页面上存在对应标签行时才出现；
/// 序列化时缺失的字段直接省略 key，不输出 null
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waitlist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_mode: Option<String>,
}

impl Section {
    /// 创建只有编号的教学班，其余字段待标签匹配后填入
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            day_time: None,
            location: None,
            instructor: None,
            availability: None,
            waitlist: None,
            enrollment_control: None,
            delivery_mode: None,
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new(NOT_AVAILABLE)
    }
}

/// 一门课程
///
/// `code_title` 为页面渲染的"课程代码 + 标题"组合，不做进一步解析；
/// `campus` / `session` / `notes` 在对应 DOM 片段缺失时为占位值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub code_title: String,
    pub campus: String,
    pub session: String,
    pub notes: String,
    pub sections: Vec<Section>,
}

impl Course {
    /// 创建全部为占位值的课程（尚未解析到任何详情）
    pub fn unavailable(code_title: impl Into<String>) -> Self {
        Self {
            code_title: code_title.into(),
            campus: NOT_AVAILABLE.to_string(),
            session: NOT_AVAILABLE.to_string(),
            notes: NOT_AVAILABLE.to_string(),
            sections: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_optional_fields_are_omitted() {
        let mut section = Section::new("LEC 0101");
        section.waitlist = Some("12".to_string());

        let json = serde_json::to_value(&section).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.get("code").unwrap(), "LEC 0101");
        assert_eq!(obj.get("waitlist").unwrap(), "12");
        // 缺失的可选字段省略 key，而不是 null
        assert!(!obj.contains_key("day_time"));
        assert!(!obj.contains_key("instructor"));
    }

    #[test]
    fn test_course_round_trip() {
        let course = Course {
            code_title: "CSC108H1 - Introduction to Computer Programming".to_string(),
            campus: "St. George".to_string(),
            session: "2025 Fall".to_string(),
            notes: NOT_AVAILABLE.to_string(),
            sections: vec![Section::new("LEC 0101")],
        };

        let json = serde_json::to_string(&course).unwrap();
        let back: Course = serde_json::from_str(&json).unwrap();
        assert_eq!(back, course);
    }

    #[test]
    fn test_unavailable_defaults() {
        let course = Course::unavailable("MAT137Y1");
        assert_eq!(course.campus, NOT_AVAILABLE);
        assert_eq!(course.session, NOT_AVAILABLE);
        assert_eq!(course.notes, NOT_AVAILABLE);
        assert!(course.sections.is_empty());
    }
}

//! 页面提取服务 - 业务能力层
//!
//! 每页采集分两个阶段：
//!
//! 1. **展开**（有副作用，幂等）：点击所有尚未展开的折叠面板，
//!    已展开的面板不再点击，重复调用是空操作
//! 2. **快照 + 纯解析**：读取渲染后的 HTML，交给 [`extract_page`]
//!    做无副作用的解析
//!
//! 解析阶段对同一份快照输出完全确定，可以脱离浏览器单独测试

use std::sync::LazyLock;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::infrastructure::BrowserSession;
use crate::models::{Course, Section, NOT_AVAILABLE};
use crate::utils::with_retries;

static COURSE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("app-course").unwrap());
static COURSE_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".accordion-button span").unwrap());
static COURSE_BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".accordion-body").unwrap());
static NOTES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".notes-details .notes").unwrap());
static SECTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".course-sections app-course-section").unwrap());
static SECTION_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".header span").unwrap());
static SECTION_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".section-item").unwrap());
static ITEM_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".item-value").unwrap());
static LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("label").unwrap());

/// 解析一页渲染后的 HTML，按 DOM 顺序返回本页全部课程
///
/// 纯函数：无副作用、无网络、输入确定则输出确定。
/// 缺失的片段一律落为占位值，未知的标签行静默丢弃，
/// 页面结构的前向变化不会让解析崩溃
pub fn extract_page(rendered_html: &str) -> Vec<Course> {
    let document = Html::parse_document(rendered_html);
    let mut courses = Vec::new();

    for course_elem in document.select(&COURSE) {
        let code_title = course_elem
            .select(&COURSE_HEADER)
            .next()
            .map(text_of)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let mut course = Course::unavailable(code_title);

        if let Some(body) = course_elem.select(&COURSE_BODY).next() {
            if let Some(campus) = labeled_value(body, "Campus") {
                course.campus = campus;
            }
            if let Some(session) = labeled_value(body, "Session") {
                course.session = session;
            }
            if let Some(notes) = body.select(&NOTES).next() {
                course.notes = text_of(notes);
            }
        }

        for section_elem in course_elem.select(&SECTION) {
            course.sections.push(parse_section(section_elem));
        }

        courses.push(course);
    }

    courses
}

/// 解析单个教学班子容器
fn parse_section(section_elem: ElementRef<'_>) -> Section {
    let code = section_elem
        .select(&SECTION_HEADER)
        .next()
        .map(text_of)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut section = Section::new(code);

    for item in section_elem.select(&SECTION_ITEM) {
        let label = item.select(&LABEL).next().map(text_of).unwrap_or_default();
        let value = item
            .select(&ITEM_VALUE)
            .next()
            .map(text_of)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        assign_section_field(&mut section, &label, value);
    }

    section
}

/// 标签子串规则，按序匹配，首个命中生效，未命中的行忽略
fn assign_section_field(section: &mut Section, label: &str, value: String) {
    if label.contains("Day/Time") {
        section.day_time = Some(value);
    } else if label.contains("Location") {
        section.location = Some(value);
    } else if label.contains("Instructor") {
        section.instructor = Some(value);
    } else if label.contains("Availability") {
        section.availability = Some(value);
    } else if label.contains("Waitlist") {
        section.waitlist = Some(value);
    } else if label.contains("Enrolment Controls") {
        section.enrollment_control = Some(value);
    } else if label.contains("Delivery Mode") {
        section.delivery_mode = Some(value);
    }
}

/// 在作用域内找到文本包含 `needle` 的 label，取其相邻元素的文本
fn labeled_value(scope: ElementRef<'_>, needle: &str) -> Option<String> {
    scope
        .select(&LABEL)
        .find(|label| text_of(*label).contains(needle))
        .and_then(|label| label.next_siblings().find_map(ElementRef::wrap))
        .map(text_of)
}

/// 取元素的文本：各文本节点去除首尾空白后拼接
fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

/// 展开结果
#[derive(Debug, Clone, Copy, Deserialize)]
struct ExpandReport {
    total: usize,
    clicked: usize,
    failed: usize,
}

/// 只点击尚未展开的面板，重复调用是空操作
const EXPAND_PANELS_JS: &str = r#"
    (() => {
        const buttons = Array.from(document.querySelectorAll('button.accordion-button'));
        let clicked = 0;
        let failed = 0;
        for (const b of buttons) {
            if (b.getAttribute('aria-expanded') === 'true') {
                continue;
            }
            try {
                b.scrollIntoView(true);
                b.click();
                clicked++;
            } catch (e) {
                failed++;
            }
        }
        return { total: buttons.length, clicked: clicked, failed: failed };
    })()
"#;

/// 面板展开服务
///
/// 职责：
/// - 执行每页协议的"展开"阶段
/// - 单个面板点击失败不中断页面，重试耗尽后记录并继续，
///   对应课程的详情字段落为占位值
pub struct PanelExpander {
    max_retries: usize,
    pause: Duration,
}

impl PanelExpander {
    /// 创建面板展开服务
    pub fn new(max_retries: usize, pause: Duration) -> Self {
        Self { max_retries, pause }
    }

    /// 展开当前页的全部折叠面板
    ///
    /// # 返回
    /// 返回本次新展开的面板数量；残余失败只记录日志
    pub async fn expand_all(&self, session: &BrowserSession) -> usize {
        let result = with_retries("展开课程面板", self.max_retries, self.pause, || async {
            let report: ExpandReport = session.eval_as(EXPAND_PANELS_JS).await?;
            if report.failed > 0 {
                anyhow::bail!("{}/{} 个面板点击失败", report.failed, report.total);
            }
            Ok(report)
        })
        .await;

        match result {
            Ok(report) => {
                debug!(
                    "面板展开完成: 本次点击 {}/{} 个",
                    report.clicked, report.total
                );
                report.clicked
            }
            Err(e) => {
                // 未展开的面板在解析时落为占位值，不中断本页
                warn!("⚠️ {}，相关课程详情将以占位值继续", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_html(code_title: &str, with_body: bool) -> String {
        let body = if with_body {
            r#"<div class="accordion-body">
                 <div><label>Campus</label><span>St. George</span></div>
                 <div><label>Session</label><span>2025 Fall</span></div>
                 <div class="notes-details"><div class="notes">Priority enrolment</div></div>
               </div>"#
        } else {
            ""
        };
        format!(
            r#"<app-course>
                 <button class="accordion-button"><span>{}</span></button>
                 {}
               </app-course>"#,
            code_title, body
        )
    }

    #[test]
    fn test_extracts_courses_in_dom_order() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            course_html("CSC108H1 - Intro to Programming", true),
            course_html("MAT137Y1 - Calculus", true),
        );

        let courses = extract_page(&html);
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].code_title, "CSC108H1 - Intro to Programming");
        assert_eq!(courses[0].campus, "St. George");
        assert_eq!(courses[0].session, "2025 Fall");
        assert_eq!(courses[0].notes, "Priority enrolment");
        assert_eq!(courses[1].code_title, "MAT137Y1 - Calculus");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = format!(
            "<html><body>{}</body></html>",
            course_html("CSC108H1 - Intro to Programming", true)
        );
        assert_eq!(extract_page(&html), extract_page(&html));
    }

    #[test]
    fn test_missing_body_falls_back_to_sentinels() {
        let html = format!("<html><body>{}</body></html>", course_html("CSC108H1", false));

        let courses = extract_page(&html);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].campus, NOT_AVAILABLE);
        assert_eq!(courses[0].session, NOT_AVAILABLE);
        assert_eq!(courses[0].notes, NOT_AVAILABLE);
    }

    #[test]
    fn test_missing_header_yields_sentinel_code_title() {
        let html = r#"<html><body><app-course></app-course></body></html>"#;

        let courses = extract_page(html);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].code_title, NOT_AVAILABLE);
    }

    #[test]
    fn test_section_label_rules_match_by_substring() {
        let html = r#"<html><body>
            <app-course>
              <button class="accordion-button"><span>CSC108H1</span></button>
              <div class="course-sections">
                <app-course-section>
                  <div class="header"><span>LEC 0101</span></div>
                  <div class="section-item"><label>Day/Time</label><div class="item-value">MO 10:00-11:00</div></div>
                  <div class="section-item"><label>Waitlist Information</label><div class="item-value">12</div></div>
                  <div class="section-item"><label>Enrolment Controls</label><div class="item-value">Restricted</div></div>
                  <div class="section-item"><label>Seat Colour</label><div class="item-value">Blue</div></div>
                </app-course-section>
              </div>
            </app-course>
        </body></html>"#;

        let courses = extract_page(html);
        let section = &courses[0].sections[0];
        assert_eq!(section.code, "LEC 0101");
        assert_eq!(section.day_time.as_deref(), Some("MO 10:00-11:00"));
        // 子串匹配，不要求标签全等
        assert_eq!(section.waitlist.as_deref(), Some("12"));
        assert_eq!(section.enrollment_control.as_deref(), Some("Restricted"));
        // 未知标签静默丢弃，不产生字段也不报错
        assert_eq!(section.location, None);
        assert_eq!(section.instructor, None);
    }

    #[test]
    fn test_sections_preserve_on_page_order() {
        let html = r#"<html><body>
            <app-course>
              <button class="accordion-button"><span>CSC108H1</span></button>
              <div class="course-sections">
                <app-course-section><div class="header"><span>LEC 0101</span></div></app-course-section>
                <app-course-section><div class="header"><span>TUT 0201</span></div></app-course-section>
                <app-course-section><div class="header"><span>PRA 0301</span></div></app-course-section>
              </div>
            </app-course>
        </body></html>"#;

        let courses = extract_page(html);
        let codes: Vec<&str> = courses[0].sections.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["LEC 0101", "TUT 0201", "PRA 0301"]);
    }

    #[test]
    fn test_empty_page_yields_no_courses() {
        assert!(extract_page("<html><body></body></html>").is_empty());
    }
}

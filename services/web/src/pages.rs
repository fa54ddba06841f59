//! Server-rendered application page: the form, the submit control, the
//! result panel and the notification toast.

use std::fmt::Write;
use tenant_risk::scoring::{
    ApplicationRecord, FieldControl, FieldKey, FieldSpec, FieldViolation, FormSection, Notification,
    NotificationVariant, PageState, ResultDetails, ResultView, RiskThresholds, SubmitControl,
};

pub(crate) struct PageView<'a> {
    pub(crate) record: &'a ApplicationRecord,
    pub(crate) state: &'a PageState,
    pub(crate) violations: &'a [FieldViolation],
    pub(crate) thresholds: &'a RiskThresholds,
}

pub(crate) fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Tenant Risk Assessment</title>\n</head>\n<body>\n<main class=\"page\">\n",
    );
    html.push_str(
        "<header>\n<h1>Tenant Risk Assessment</h1>\n\
         <p>Submit an application to receive a risk score and recommendation.</p>\n</header>\n",
    );

    if let Some(notification) = &view.state.notification {
        render_notification(&mut html, notification);
    }

    render_form(&mut html, view);
    render_result_panel(&mut html, view);

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_notification(html: &mut String, notification: &Notification) {
    let variant = match notification.variant {
        NotificationVariant::Default => "default",
        NotificationVariant::Destructive => "destructive",
    };
    writeln!(
        html,
        "<div class=\"toast toast-{variant}\" role=\"status\"><strong>{}</strong><p>{}</p></div>",
        escape_html(&notification.title),
        escape_html(&notification.description)
    )
    .expect("write notification");
}

fn render_form(html: &mut String, view: &PageView<'_>) {
    html.push_str("<form method=\"post\" action=\"/assess\" class=\"application-form\">\n");

    if !view.violations.is_empty() {
        html.push_str("<ul class=\"form-errors\" role=\"alert\">\n");
        for violation in view.violations {
            writeln!(html, "<li>{}</li>", escape_html(&violation.message()))
                .expect("write violation");
        }
        html.push_str("</ul>\n");
    }

    for section in FormSection::ordered() {
        writeln!(
            html,
            "<fieldset class=\"form-section\">\n<legend>{}</legend>",
            escape_html(section.label())
        )
        .expect("write section");
        for spec in section.fields() {
            render_field(html, spec, view.record, has_violation(view.violations, spec.key));
        }
        html.push_str("</fieldset>\n");
    }

    let submit = SubmitControl::for_loading(view.state.loading);
    writeln!(
        html,
        "<button type=\"submit\"{}{}>{}</button>",
        if submit.disabled { " disabled" } else { "" },
        if submit.busy { " aria-busy=\"true\"" } else { "" },
        escape_html(submit.label)
    )
    .expect("write submit control");
    html.push_str("</form>\n");
}

fn has_violation(violations: &[FieldViolation], key: FieldKey) -> bool {
    violations.iter().any(|violation| violation.key == key)
}

fn render_field(html: &mut String, spec: &FieldSpec, record: &ApplicationRecord, invalid: bool) {
    let name = spec.key.as_str();
    let value = escape_html(&spec.key.display_value(record));
    let mut attributes = String::new();
    if spec.required {
        attributes.push_str(" required");
    }
    if invalid {
        attributes.push_str(" aria-invalid=\"true\"");
    }
    if let Some(placeholder) = spec.placeholder {
        write!(attributes, " placeholder=\"{}\"", escape_html(placeholder))
            .expect("write placeholder");
    }

    if matches!(spec.control, FieldControl::Checkbox) {
        let checked = if value == "true" { " checked" } else { "" };
        writeln!(
            html,
            "<div class=\"field field-checkbox\"><input type=\"checkbox\" id=\"{name}\" \
             name=\"{name}\" value=\"on\"{checked}{attributes}><label for=\"{name}\">{}</label></div>",
            escape_html(spec.label)
        )
        .expect("write checkbox");
        return;
    }

    writeln!(
        html,
        "<div class=\"field\"><label for=\"{name}\">{}</label>",
        escape_html(spec.label)
    )
    .expect("write label");

    let written = match spec.control {
        FieldControl::ReadOnly => writeln!(
            html,
            "<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\" readonly>"
        ),
        FieldControl::Text => writeln!(
            html,
            "<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\"{attributes}>"
        ),
        FieldControl::Integer { min, max, .. } => {
            let max = max.map(|max| format!(" max=\"{max}\"")).unwrap_or_default();
            writeln!(
                html,
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\" \
                 min=\"{min}\"{max} step=\"1\"{attributes}>"
            )
        }
        FieldControl::Decimal { min, max, step, .. } => {
            let max = max.map(|max| format!(" max=\"{max}\"")).unwrap_or_default();
            writeln!(
                html,
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\" \
                 min=\"{min}\"{max} step=\"{step}\"{attributes}>"
            )
        }
        FieldControl::Choice { options } => {
            writeln!(html, "<select id=\"{name}\" name=\"{name}\"{attributes}>")
                .expect("write select");
            for option in options {
                let selected = if option.value == value { " selected" } else { "" };
                writeln!(
                    html,
                    "<option value=\"{}\"{selected}>{}</option>",
                    escape_html(option.value),
                    escape_html(option.label)
                )
                .expect("write option");
            }
            writeln!(html, "</select>")
        }
        FieldControl::Checkbox => Ok(()),
    };
    written.expect("write control");

    html.push_str("</div>\n");
}

fn render_result_panel(html: &mut String, view: &PageView<'_>) {
    html.push_str("<section class=\"result-panel\">\n");

    let Some(result) = &view.state.result else {
        let message = if view.state.loading {
            "Analyzing application..."
        } else {
            "Submit an application to see the risk assessment."
        };
        writeln!(html, "<p class=\"result-placeholder\">{message}</p>")
            .expect("write placeholder");
        html.push_str("</section>\n");
        return;
    };

    let result_view = ResultView::new(result, view.thresholds);
    writeln!(
        html,
        "<div class=\"score {}\">{}</div>\n<span class=\"badge {}\">{}</span>",
        result_view.score_tone.css_class(),
        escape_html(&result_view.score),
        result_view.badge.tone.css_class(),
        escape_html(&result_view.badge.label)
    )
    .expect("write score");

    let recommendation = &result_view.recommendation;
    writeln!(
        html,
        "<div class=\"recommendation {}\" data-icon=\"{}\"><strong>{}</strong><p>{}</p></div>",
        recommendation.tone.css_class(),
        recommendation.icon,
        escape_html(&recommendation.text),
        escape_html(recommendation.caption)
    )
    .expect("write recommendation");

    writeln!(
        html,
        "<div class=\"confidence\"><span>Confidence</span><span>{}</span>\
         <div class=\"bar\"><div class=\"fill\" style=\"width: {:.1}%\"></div></div></div>",
        escape_html(&result_view.confidence),
        result_view.confidence_percent
    )
    .expect("write confidence");

    match &result_view.details {
        ResultDetails::Reasoning {
            reasoning,
            default_probability,
        } => {
            if !reasoning.is_empty() {
                writeln!(html, "<p class=\"reasoning\">{}</p>", escape_html(reasoning))
                    .expect("write reasoning");
            }
            writeln!(
                html,
                "<p class=\"default-probability\">Default Probability: {}</p>",
                escape_html(default_probability)
            )
            .expect("write default probability");
        }
        ResultDetails::Model {
            model_version,
            inference_time,
        } => {
            writeln!(
                html,
                "<dl class=\"model\"><dt>Model Version</dt><dd>{}</dd>\
                 <dt>Inference Time</dt><dd>{}</dd></dl>",
                escape_html(model_version),
                escape_html(inference_time)
            )
            .expect("write model details");
        }
    }

    html.push_str("</section>\n");
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenant_risk::scoring::{
        ApplicantId, Confidence, Notification, RiskCategory, ScoreResult, ViolationKind,
    };

    fn record() -> ApplicationRecord {
        let mut record = ApplicationRecord::with_applicant_id(ApplicantId("APP-42".to_string()));
        record.name = "Jane <Doe>".to_string();
        record
    }

    fn approved() -> ScoreResult {
        ScoreResult {
            success: true,
            applicant_id: "APP-42".to_string(),
            risk_score: 25.0,
            risk_category: RiskCategory::Low,
            default_probability: 0.05,
            recommendation: "APPROVE".to_string(),
            confidence: Confidence::fraction(0.92),
            reasoning: "Strong credit history".to_string(),
            model_version: None,
            inference_time_ms: None,
        }
    }

    fn render(state: &PageState, violations: &[FieldViolation]) -> String {
        let record = record();
        render_page(&PageView {
            record: &record,
            state,
            violations,
            thresholds: &RiskThresholds::default(),
        })
    }

    #[test]
    fn fresh_page_renders_every_section_and_a_placeholder() {
        let html = render(&PageState::default(), &[]);

        for section in FormSection::ordered() {
            assert!(html.contains(&escape_html(section.label())), "{section:?}");
        }
        assert!(html.contains(
            "<input type=\"text\" id=\"applicant_id\" name=\"applicant_id\" value=\"APP-42\" readonly>"
        ));
        assert!(html.contains("value=\"Jane &lt;Doe&gt;\""));
        assert!(html.contains("min=\"300\" max=\"850\" step=\"1\" required"));
        assert!(html.contains("step=\"0.1\""));
        assert!(html.contains(
            "name=\"monthly_income\" value=\"0\" min=\"0\" step=\"1\" required"
        ));
        assert!(!html.contains("step=\"any\""));
        assert!(html.contains("<option value=\"12\" selected>12 Months</option>"));
        assert!(html.contains("<button type=\"submit\">Calculate Risk Score</button>"));
        assert!(html.contains("Submit an application to see the risk assessment."));
    }

    #[test]
    fn loading_page_disables_the_submit_control() {
        let state = PageState {
            loading: true,
            ..PageState::default()
        };

        let html = render(&state, &[]);

        assert!(html.contains(
            "<button type=\"submit\" disabled aria-busy=\"true\">Analyzing Risk...</button>"
        ));
    }

    #[test]
    fn scored_page_shows_the_result_and_notification() {
        let result = approved();
        let state = PageState {
            loading: false,
            notification: Some(Notification::scored(&result)),
            result: Some(result),
        };

        let html = render(&state, &[]);

        assert!(html.contains("<div class=\"score tone-success\">25</div>"));
        assert!(html.contains("LOW RISK"));
        assert!(html.contains("data-icon=\"check-circle\"><strong>APPROVE</strong>"));
        assert!(html.contains("<span>92.0%</span>"));
        assert!(html.contains("width: 92.0%"));
        assert!(html.contains("Default Probability: 5.0%"));
        assert!(html.contains("Risk Assessment Complete"));
        assert!(html.contains("Score: 25 - LOW Risk"));
    }

    #[test]
    fn violations_are_listed_and_flagged() {
        let violations = [FieldViolation {
            key: FieldKey::Name,
            kind: ViolationKind::Missing,
        }];

        let html = render(&PageState::default(), &violations);

        assert!(html.contains("<li>Full Name is required</li>"));
        assert!(html.contains("name=\"name\" value=\"Jane &lt;Doe&gt;\" required aria-invalid=\"true\""));
    }
}

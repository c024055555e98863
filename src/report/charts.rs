//! ECharts visualizations for the budget report.
//!
//! - **Spending per budget**: a donut chart of how the spending is split.
//! - **Budgeted and spent**: a bar chart comparing both amounts per budget.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Bar, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{currency::Currency, html::HeadElement, report::summary::BudgetReportSummary};

/// The ECharts script every report page loads.
pub(super) const ECHARTS_SCRIPT: &str = "/static/echarts.6.0.0.min.js";

/// A report chart with its HTML container ID and ECharts configuration.
#[derive(Debug, Clone)]
pub(super) struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for report charts.
pub(super) fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates the JavaScript that initializes the report charts once the page
/// has loaded, following the browser's dark mode setting.
pub(super) fn charts_script(charts: &[ReportChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chart = echarts.init(document.getElementById("{}"));
                    chart.setOption({});

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    )))
}

pub(super) fn spending_pie_chart(summary: &BudgetReportSummary, currency: &Currency) -> ReportChart {
    let data: Vec<(f64, &str)> = summary
        .budget_lines
        .iter()
        .filter(|line| line.spent > 0.0)
        .map(|line| (line.spent, line.budget.name.as_str()))
        .collect();

    let chart = Chart::new()
        .title(Title::new().text("Spending per budget").left(20).top("1%"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter(&currency.code)),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Spent")
                .radius(vec!["40%", "70%"])
                .data(data),
        );

    ReportChart {
        id: "spending-per-budget-chart",
        options: chart.to_string(),
    }
}

pub(super) fn budget_bar_chart(summary: &BudgetReportSummary, currency: &Currency) -> ReportChart {
    let labels: Vec<String> = summary
        .budget_lines
        .iter()
        .map(|line| line.budget.name.clone())
        .collect();
    let budgeted: Vec<f64> = summary.budget_lines.iter().map(|line| line.budgeted).collect();
    let spent: Vec<f64> = summary.budget_lines.iter().map(|line| line.spent).collect();

    let chart = Chart::new()
        .title(
            Title::new()
                .text("Budgeted and spent")
                .subtext(format!("In {}", currency.code))
                .left(20)
                .top("1%"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter(&currency.code))
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(&currency.code))),
        )
        .series(Bar::new().name("Budgeted").data(budgeted))
        .series(Bar::new().name("Spent").data(spent));

    ReportChart {
        id: "budgeted-and-spent-chart",
        options: chart.to_string(),
    }
}

fn currency_formatter(currency_code: &str) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat(undefined, {{
              style: 'currency',
              currency: '{currency_code}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";"
        ),
    )
}

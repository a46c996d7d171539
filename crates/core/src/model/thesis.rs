//! Built-in thesis schedule.

use chrono::NaiveDate;

use crate::model::section::SectionDraft;

pub(crate) fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 20).unwrap_or_default()
}

pub(crate) fn deadline() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 30).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn row(
    date: &str,
    chapter: u8,
    chapter_name: &str,
    title: &str,
    concepts: &str,
    paper: &str,
    purpose: &str,
    words: u32,
) -> SectionDraft {
    SectionDraft {
        date: date.to_owned(),
        chapter,
        chapter_name: chapter_name.to_owned(),
        title: title.to_owned(),
        concepts: concepts.to_owned(),
        purpose: purpose.to_owned(),
        paper: paper.to_owned(),
        words,
        critical: false,
    }
}

/// Data-collection session: no prose, blocks the chapters that follow.
fn session(date: &str, chapter: u8, title: &str, concepts: &str) -> SectionDraft {
    SectionDraft {
        critical: true,
        ..row(date, chapter, "DATA", title, concepts, "-", "CRITICAL", 0)
    }
}

#[rustfmt::skip]
#[allow(clippy::too_many_lines)]
pub(crate) fn sections() -> Vec<SectionDraft> {
    const INTRO: &str = "Introduction";
    const LIT: &str = "Literature Review";
    const THEORY: &str = "Theoretical Framework";
    const METHOD: &str = "Methodology";
    const FINDINGS: &str = "Findings";
    const DISCUSSION: &str = "Discussion";
    const CONCLUSION: &str = "Conclusion";

    vec![
        row("Feb 20", 1, INTRO, "1.1 Background and Context", "AI in L2 writing, performance vs learning", "Warschauer et al. (2023)", "Anchor problem", 250),
        row("Feb 21", 1, INTRO, "1.2 Statement of the Problem", "Surface diversity, dependency", "Feng et al. (2025)", "Justify gap", 250),
        row("Feb 22", 1, INTRO, "1.3 Research Questions", "Retention comparison, involvement prediction", "Laufer & Hulstijn (2001)", "Frame inquiry", 250),
        row("Feb 22", 1, INTRO, "1.4 Significance", "Pedagogical frameworks", "Your synthesis", "Claim contribution", 250),
        row("Feb 23", 1, INTRO, "1.5 Scope and Delimitations", "N=10, 2-week delay", "-", "Bound claims", 250),
        row("Feb 24", 1, INTRO, "1.6 Organization", "Chapter overview", "-", "Guide reader", 250),

        row("Feb 27", 2, LIT, "2.1 AI Writing Tools in L2", "Generative AI, AWE", "Hwang et al. (2025)", "Method precedent", 650),
        row("Feb 28", 2, LIT, "2.2 Vocabulary Theories", "Incidental learning, depth vs breadth", "Laufer & Hulstijn; Wesche & Paribakht", "Primary theory", 650),
        row("Mar 1", 2, LIT, "2.3 Lexical Sophistication", "Frequency, range, psycholinguistic", "Kim et al.; Kyle & Crossley", "Operationalize", 650),
        row("Mar 2", 2, LIT, "2.4 Performance vs Learning", "Output quality, essay scores", "Jarvis (2013)", "Warn overclaim", 650),
        row("Mar 3", 2, LIT, "2.5 Dependency and Trust", "Manufactured dependency", "Ranalli (2021); Ranalli et al.", "Dependency lens", 650),
        row("Mar 4", 2, LIT, "2.6 Research Gap", "Longitudinal studies missing", "Feng et al. (2025)", "Entry point", 650),

        row("Mar 5", 3, THEORY, "3.1 Involvement Load Hypothesis", "Need, search, evaluation", "Laufer & Hulstijn (2001)", "Core framework", 400),
        row("Mar 6", 3, THEORY, "3.2 Vocabulary Knowledge Scale", "Receptive vs productive", "Wesche & Paribakht (1996)", "Measurement tool", 400),
        row("Mar 7", 3, THEORY, "3.3 Skill Acquisition Theory", "Declarative → procedural", "Anderson; DeKeyser", "Background", 400),
        row("Mar 8", 3, THEORY, "3.4 Noticing Hypothesis", "Conscious attention", "Schmidt (1990)", "Prerequisite", 400),
        row("Mar 9", 3, THEORY, "3.5 Synthesis: Theoretical Model", "Involvement → depth → retention", "Your synthesis", "Unique contribution", 400),

        row("Mar 10", 4, METHOD, "4.1 Research Design", "Mixed-methods, within-subjects", "Hwang et al. (2025)", "Justify design", 300),
        row("Mar 11", 4, METHOD, "4.2 Participants", "10 students, sampling", "-", "Sampling strategy", 300),
        row("Mar 12", 4, METHOD, "4.3 Instruments", "VKS test, interview protocol", "Wesche & Paribakht", "Validity", 300),
        row("Mar 13", 4, METHOD, "4.4 Procedure", "Session A, B, C overview", "Your design", "Replicability", 300),
        session("Mar 13", 4, "Session A: No AI Writing", "Baseline data collection"),
        session("Mar 14", 4, "Session B: AI-Assisted", "ChatGPT interaction"),
        row("Mar 14", 4, METHOD, "4.5 Data Collection Details", "Physical monitoring", "-", "Execution", 300),
        row("Mar 15", 4, METHOD, "4.6 Data Analysis", "Paired comparison, thematic", "-", "Rigor", 300),
        row("Mar 16", 4, METHOD, "4.6 Data Analysis", "Paired comparison, thematic", "-", "Rigor", 300),
        row("Mar 17", 4, METHOD, "4.8 Limitations", "N=10, 2-week delay", "-", "Honest scholarship", 300),

        session("Mar 20", 5, "Session C: Delayed Test", "Retention measurement"),
        row("Mar 20", 5, FINDINGS, "5.1 Data Overview", "Response rates, completion", "-", "Presentation", 500),
        row("Mar 21", 5, FINDINGS, "5.2 Retention Comparison", "Session A vs B rates", "Your data", "Answer RQ1", 500),
        row("Mar 22", 5, FINDINGS, "5.3 Involvement Correlations", "Time, acceptance vs retention", "Laufer & Hulstijn", "Answer RQ2", 500),
        row("Mar 23", 5, FINDINGS, "5.4 Acceptance Rationales", "Why accept/reject", "Interview data", "Insight", 500),
        row("Mar 24", 5, FINDINGS, "5.5 Case Profiles", "Jahed, others", "Your data", "Illustrate", 500),
        row("Mar 25", 5, FINDINGS, "5.6 Synthesis: Three Patterns", "Scaffolding, prosthesis, hybrid", "Your synthesis", "Classification", 500),

        row("Mar 26", 6, DISCUSSION, "6.1 Interpretation", "Acquisition vs borrowing", "Warschauer et al.", "Meaning-making", 500),
        row("Mar 27", 6, DISCUSSION, "6.2 Theoretical Implications", "ILH confirmed", "Laufer & Hulstijn", "Theory", 500),
        row("Mar 28", 6, DISCUSSION, "6.3 Pedagogical Implications", "Maximize involvement", "Your synthesis", "Application", 500),
        row("Mar 29", 6, DISCUSSION, "6.4 Methodological Contributions", "Separate performance/learning", "Your design", "Novelty", 500),
        row("Mar 29", 6, DISCUSSION, "6.5 Limitations & Future", "N=10, short delay", "-", "Boundaries", 500),

        row("Mar 30", 7, CONCLUSION, "7.1 Summary", "Restate RQs, answers", "Your synthesis", "Recapitulation", 400),
        row("Mar 30", 7, CONCLUSION, "7.2 Final Remarks", "Lexical prosthesis warning", "Your voice", "Closing", 400),
    ]
}

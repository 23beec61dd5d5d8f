//! Instruction templates and personas.

pub(super) const COMMENT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that analyzes YouTube comments and provides insights.";

pub(super) const CHART_SYSTEM_PROMPT: &str = "당신은 유튜브 채널 분석 전문가입니다. \
     데이터를 바탕으로 전문적이고 통찰력 있는 분석을 제공합니다.";

pub(super) const COMMENT_PROMPT_HEADER: &str = "Analyze the following YouTube comments:";

/// Output contract for the comment path. The normalizer validates against this shape.
pub(super) const COMMENT_SCHEMA_CONTRACT: &str = r#"Return the analysis as a single JSON object with exactly this shape:
{
    "keywords": [
        {"word": "keyword", "count": 3, "examples": ["example comment 1", "example comment 2"]}
    ],
    "sentiment": {
        "positive": 60,
        "negative": 10,
        "neutral": 30,
        "examples": {
            "positive": ["positive comment example"],
            "negative": ["negative comment example"],
            "neutral": ["neutral comment example"]
        }
    },
    "categories": [
        {"name": "topic", "examples": ["related comment 1", "related comment 2"]}
    ],
    "feedback": [
        {"type": "feedback type", "content": "feedback content", "examples": ["related comment"]}
    ]
}
"count" is a non-negative integer. "positive", "negative" and "neutral" are percentages between 0 and 100 that sum to 100.
Every field must be present; use empty arrays when nothing applies. Quote examples verbatim from the comments."#;

pub(super) const ENGAGEMENT_TEMPLATE: &str = "\
다음은 유튜브 채널의 참여율 데이터입니다:
평균 좋아요 비율: {like_ratio}%
평균 댓글 비율: {comment_ratio}%
평균 총 참여율: {total_engagement}%

이 데이터를 바탕으로 채널의 시청자 참여도에 대해 한 문장으로 분석해주세요.
전문적이고 통찰력 있게 작성해주세요.";

pub(super) const GROWTH_TEMPLATE: &str = "\
다음은 유튜브 채널의 성장 지표입니다:
총 조회수: {total_views}
평균 조회수: {avg_views}
조회수 증가율: {view_growth}%

이 데이터를 바탕으로 채널의 성장세에 대해 한 문장으로 분석해주세요.
전문적이고 통찰력 있게 작성해주세요.";

pub(super) const UPLOAD_TEMPLATE: &str = "\
다음은 유튜브 채널의 업로드 패턴 데이터입니다:
가장 많이 업로드하는 요일: {top_day}
가장 많이 업로드하는 시간대: {top_hour}
평균 업로드 주기: {upload_interval}일

이 데이터를 바탕으로 채널의 콘텐츠 업로드 전략에 대해 한 문장으로 분석해주세요.
전문적이고 통찰력 있게 작성해주세요.";

pub(super) const CONTENT_PERFORMANCE_TEMPLATE: &str = "\
다음은 유튜브 채널의 영상 길이별 성과 데이터입니다:
가장 성과가 좋은 길이: {best_duration}
- 평균 조회수: {best_views}회
- 평균 참여율: {best_engagement}%

10분 미만 영상 평균 조회수: {short_views}회
10-20분 영상 평균 조회수: {medium_views}회
20분 이상 영상 평균 조회수: {long_views}회

이 데이터를 바탕으로 최적의 영상 길이 전략에 대해 한 문장으로 분석해주세요.
전문적이고 통찰력 있게 작성해주세요.";

pub(super) const CORE_FANS_TEMPLATE: &str = "\
다음은 유튜브 채널의 핵심 팬 데이터입니다:
핵심 팬 수: {total_core_fans}명
최고 활동 팬:
- 댓글 수: {top_fan_comments}개
- 받은 좋아요: {top_fan_likes}개
- 참여율: {top_fan_engagement}%

핵심 팬 평균:
- 팬당 평균 댓글 수: {avg_comments_per_fan:.1f}개
- 평균 참여율: {avg_engagement_rate:.1f}%

이 데이터를 바탕으로 채널의 팬 커뮤니티 특성에 대해 한 문장으로 분석해주세요.
전문적이고 통찰력 있게 작성해주세요.";

//! 사용자 세션 서비스 백엔드
//!
//! JWT 이중 토큰(액세스 + 리프레시) 기반의 사용자 인증 백엔드입니다.
//! 회원가입(multipart 이미지 업로드 포함), 로그인/로그아웃, 토큰
//! 갱신과 회전, 비밀번호 변경, 프로필 관리, 채널 프로필 집계 조회를
//! 제공합니다.
//!
//! # 아키텍처
//!
//! 계층형 구조를 따릅니다:
//!
//! - `handlers` - HTTP 경계 (multipart 파싱, 쿠키, 상태 코드)
//! - `middlewares` - 인증 가드 (Required/Optional)
//! - `services` - 비즈니스 로직 (세션 수명주기, 토큰, 미디어)
//! - `repositories` - MongoDB 영속화 (`UserStore` trait 경계)
//! - `domain` - 엔티티, DTO, 토큰 클레임
//!
//! 저장소와 미디어 호스트는 trait 뒤에 있어 테스트에서 인메모리
//! 가짜로 대체됩니다.

pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
